//! Text-completion client for the local LLM backend.
//!
//! This crate provides the boundary the dialogue engine uses to talk to a
//! language model. It handles:
//! - The `TextCompletion` trait, so the engine can run against a fake
//! - A client for llamafile's OpenAI-compatible `/chat/completions` API
//! - Model discovery through `GET /models` when no model is configured
//! - Prompt templates for filter extraction and follow-up questions

pub mod config;
pub mod prompts;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

pub use config::{ConfigError, LlamafileConfig};
pub use prompts::{EXTRACTION_SAMPLING, QUESTION_SAMPLING, Sampling};

/// Errors that can occur when calling the LLM backend
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Failed to reach LLM backend: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM backend returned no content")]
    EmptyResponse,

    #[error("LLM backend lists no models")]
    NoModel,

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),
}

/// A pluggable text-completion capability.
///
/// Implementations must be cheap to share across sessions; the engine
/// holds them behind an `Arc`.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete `user_text` under `system_prompt`.
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        sampling: Sampling,
    ) -> Result<String, CompletionError>;

    /// Whether the backend is reachable and has a model loaded.
    async fn ready(&self) -> bool {
        true
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for a llamafile server (or any OpenAI-compatible endpoint).
#[derive(Clone)]
pub struct LlamafileClient {
    http: Client,
    config: LlamafileConfig,
    model: Arc<OnceCell<String>>,
}

impl LlamafileClient {
    /// Build a client. No request is made until the first completion.
    pub fn new(config: LlamafileConfig) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent("MovieAgent/1.0")
            .build()?;
        info!(base_url = %config.base(), "Configured LLM backend");
        Ok(Self {
            http,
            config,
            model: Arc::new(OnceCell::new()),
        })
    }

    /// Get the address of the LLM backend this client talks to.
    pub fn base_url(&self) -> &str {
        self.config.base()
    }

    /// The configured model, or the first model the server lists.
    ///
    /// Discovery happens once; the answer is cached for the lifetime of
    /// the client.
    pub async fn model_id(&self) -> Result<String, CompletionError> {
        if let Some(model) = &self.config.model {
            return Ok(model.clone());
        }
        self.model
            .get_or_try_init(|| async {
                let url = format!("{}/models", self.config.base());
                let response = self
                    .http
                    .get(&url)
                    .bearer_auth(&self.config.api_key)
                    .send()
                    .await
                    .map_err(|e| self.map_transport(e))?;
                let response = check_status(response).await?;
                let models: ModelList = response.json().await?;
                let model = models
                    .data
                    .into_iter()
                    .next()
                    .map(|entry| entry.id)
                    .ok_or(CompletionError::NoModel)?;
                debug!(%model, "Discovered model");
                Ok(model)
            })
            .await
            .cloned()
    }

    fn map_transport(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.config.timeout)
        } else {
            CompletionError::Http(err)
        }
    }
}

#[async_trait]
impl TextCompletion for LlamafileClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        sampling: Sampling,
    ) -> Result<String, CompletionError> {
        let model = self.model_id().await?;
        let request = ChatCompletionRequest {
            model: &model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base());
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("LLM request failed: {}", e);
                self.map_transport(e)
            })?;
        let response = check_status(response).await?;

        let parsed: ChatCompletionResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        debug!(chars = content.len(), "Received completion");
        Ok(content)
    }

    async fn ready(&self) -> bool {
        match self.model_id().await {
            Ok(_) => true,
            Err(err) => {
                debug!("LLM backend not ready: {}", err);
                false
            }
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CompletionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    error!(status = status.as_u16(), "LLM backend returned an error");
    Err(CompletionError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::{get, post}};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    /// Start a mock llamafile server on a random port
    async fn start_mock_backend(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Mock backend failed");
        });

        (format!("http://{}/v1", addr), handle)
    }

    fn client_for(base_url: String, model: Option<&str>) -> LlamafileClient {
        LlamafileClient::new(LlamafileConfig {
            base_url,
            model: model.map(str::to_string),
            timeout: Duration::from_secs(2),
            ..LlamafileConfig::default()
        })
        .expect("Failed to build client")
    }

    fn echo_router() -> Router {
        Router::new()
            .route("/v1/models", get(|| async { Json(json!({"data": [{"id": "tiny-model"}]})) }))
            .route(
                "/v1/chat/completions",
                post(|Json(body): Json<Value>| async move {
                    let model = body["model"].as_str().unwrap_or_default().to_string();
                    let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": format!("{model}|{user}")}}]
                    }))
                }),
            )
    }

    #[tokio::test]
    async fn test_complete_discovers_model() {
        let (addr, handle) = start_mock_backend(echo_router()).await;
        let client = client_for(addr, None);

        let text = client
            .complete("system", "hello", EXTRACTION_SAMPLING)
            .await
            .expect("completion failed");
        assert_eq!(text, "tiny-model|hello");
        assert!(client.ready().await);

        handle.abort();
    }

    #[tokio::test]
    async fn test_configured_model_is_used() {
        let (addr, handle) = start_mock_backend(echo_router()).await;
        let client = client_for(addr, Some("pinned"));

        let text = client.complete("s", "u", QUESTION_SAMPLING).await.unwrap();
        assert_eq!(text, "pinned|u");

        handle.abort();
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "loading model") }),
        );
        let (addr, handle) = start_mock_backend(router).await;
        let client = client_for(addr, Some("m"));

        let err = client.complete("s", "u", EXTRACTION_SAMPLING).await.unwrap_err();
        assert!(matches!(err, CompletionError::Status { status: 503, .. }));

        handle.abort();
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let (addr, handle) = start_mock_backend(router).await;
        let client = client_for(addr, Some("m"));

        let err = client.complete("s", "u", EXTRACTION_SAMPLING).await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));

        handle.abort();
    }

    #[tokio::test]
    async fn test_not_ready_without_models() {
        let router = Router::new().route("/v1/models", get(|| async { Json(json!({"data": []})) }));
        let (addr, handle) = start_mock_backend(router).await;
        let client = client_for(addr, None);

        assert!(!client.ready().await);
        assert!(matches!(client.model_id().await, Err(CompletionError::NoModel)));

        handle.abort();
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Grab a free port, then close it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}/v1", addr), None);
        assert!(!client.ready().await);
    }
}
