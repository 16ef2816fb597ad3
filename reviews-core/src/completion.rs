//! Completion service abstraction

use async_trait::async_trait;

use crate::{Error, Result};

/// Text-generation backend used to synthesize summaries and keywords
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &'static str;

    /// Generate a completion for a prompt
    ///
    /// The call is awaited to completion; timeouts are the backend's concern.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Reject completions that carry no text
pub(crate) fn require_text(backend: &str, completion: String) -> Result<String> {
    if completion.trim().is_empty() {
        return Err(Error::Generation(format!(
            "{} returned an empty completion",
            backend
        )));
    }
    Ok(completion)
}
