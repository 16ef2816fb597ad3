//! Messages API client used as the completion service

use async_trait::async_trait;
use reviews_core::config::CompletionConfig;
use reviews_core::{CompletionService, Secrets};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

const API_VERSION: &str = "2023-06-01";
const MESSAGES_PATH: &str = "v1/messages";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Anthropic Messages API
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Create a client from configuration and an API key
    pub fn new(config: &CompletionConfig, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = messages_url(&config.base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        info!(endpoint = %endpoint, model = %config.model, "Created completion client");

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Create a client with the API key taken from the environment or secrets file
    pub fn from_secrets(config: &CompletionConfig, secrets: &Secrets) -> Result<Self> {
        let api_key = secrets.api_key().ok_or(Error::MissingApiKey)?;
        Self::new(config, api_key)
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the messages endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send a single-turn prompt and return the text of the reply
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending completion request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response.json().await?;
        first_text(body)
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionService for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> reviews_core::Result<String> {
        Ok(self.complete(prompt).await?)
    }
}

/// Resolve the messages endpoint under a base URL
fn messages_url(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

    if base.cannot_be_a_base() {
        return Err(Error::InvalidUrl(base_url.to_string()));
    }

    // Keep any path prefix on the base URL
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(MESSAGES_PATH)
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))
}

/// Pick the first text block of a response
fn first_text(response: MessagesResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .find_map(|block| block.text)
        .ok_or(Error::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_messages_url() {
        let url = messages_url("https://api.anthropic.com").unwrap();
        assert_eq!(url.as_str(), "https://api.anthropic.com/v1/messages");

        let url = messages_url("http://localhost:8089/proxy").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8089/proxy/v1/messages");
    }

    #[test]
    fn test_messages_url_invalid() {
        assert!(matches!(messages_url("nope"), Err(Error::InvalidUrl(_))));
        assert!(matches!(
            messages_url("mailto:someone@example.com"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_first_text_skips_non_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "fit,price"}
            ]
        }))
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "fit,price");
    }

    #[test]
    fn test_first_text_empty() {
        let response: MessagesResponse = serde_json::from_value(json!({"content": []})).unwrap();
        assert!(matches!(first_text(response), Err(Error::EmptyResponse)));
    }

    #[test]
    fn test_from_secrets_requires_key() {
        // Only meaningful when the variable is absent from the test environment
        if std::env::var("ANTHROPIC_API_KEY").is_ok() {
            return;
        }
        let result = AnthropicClient::from_secrets(&CompletionConfig::default(), &Secrets::default());
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(base_url: String) -> CompletionConfig {
        CompletionConfig {
            base_url,
            ..CompletionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_complete_against_local_server() {
        async fn handler(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
            assert_eq!(headers["x-api-key"], "test-key");
            assert_eq!(headers["anthropic-version"], API_VERSION);
            assert_eq!(body["messages"][0]["role"], "user");
            let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
            (
                StatusCode::OK,
                Json(json!({
                    "content": [{"type": "text", "text": format!("echo:{}", prompt)}]
                })),
            )
        }

        let base = serve(Router::new().route("/v1/messages", post(handler))).await;
        let client = AnthropicClient::new(&config(base), "test-key").unwrap();

        let text = client.generate("hello").await.unwrap();
        assert_eq!(text, "echo:hello");
    }

    #[tokio::test]
    async fn test_api_error_surfaces_message() {
        async fn handler() -> (StatusCode, Json<Value>) {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "type": "error",
                    "error": {"type": "overloaded_error", "message": "Overloaded"}
                })),
            )
        }

        let base = serve(Router::new().route("/v1/messages", post(handler))).await;
        let client = AnthropicClient::new(&config(base), "test-key").unwrap();

        let err = client.complete("hello").await.unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Overloaded");
            }
            other => panic!("unexpected error: {}", other),
        }

        let core = client.generate("hello").await.unwrap_err();
        assert!(matches!(core, reviews_core::Error::Generation(_)));
    }
}
