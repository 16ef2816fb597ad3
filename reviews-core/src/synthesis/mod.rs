//! Synthesized content pipeline
//!
//! Keeps the AI summary review and the product keyword set in step with the
//! human reviews of each product.

mod coordinator;
mod prompts;
mod submission;
mod trigger;

pub use coordinator::{Draft, SynthesisCoordinator, SynthesisOutcome, SynthesisPlan};
pub use prompts::{build_keyword_prompt, build_summary_prompt, human_reviews, PromptKind};
pub use submission::{SubmissionHandler, SubmissionReceipt};
pub use trigger::should_trigger;
