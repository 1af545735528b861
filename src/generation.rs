//! Answer generation from retrieved context.
//!
//! The [`AnswerGenerator`] trait turns a context blob and a question into a
//! plain-text answer by calling a remote language model.
//! [`OpenAIChatGenerator`] (feature `openai`) is the production
//! implementation.

use async_trait::async_trait;

use crate::error::Result;

/// The fixed system instruction used to ground the model in retrieved context.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the context below to answer the user's question.";

/// Build the user-role message body from a context blob and question.
///
/// An empty context produces a context-free prompt; the question is still
/// asked.
pub fn build_user_prompt(context: &str, question: &str) -> String {
    format!("Context:\n{context}\n\nQuestion:\n{question}\n\nAnswer:")
}

/// Generates a grounded answer by calling a remote language model.
///
/// Implementations construct a role-tagged message set (system + user) and
/// normalize the provider's response shape into plain text, failing with
/// [`RagError::GenerationError`](crate::error::RagError::GenerationError)
/// when the expected content field is absent.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// A short name identifying the backend, used in logs and errors.
    fn name(&self) -> &str;

    /// Generate an answer grounded in `context`.
    async fn generate(&self, context: &str, question: &str) -> Result<String>;
}

#[cfg(feature = "openai")]
pub use openai_chat::OpenAIChatGenerator;

#[cfg(feature = "openai")]
mod openai_chat {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tracing::{debug, error};

    use super::{AnswerGenerator, SYSTEM_PROMPT, build_user_prompt};
    use crate::error::{RagError, Result};

    /// The default OpenAI chat completions API endpoint.
    const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

    /// The default chat model.
    const DEFAULT_MODEL: &str = "gpt-4";

    const PROVIDER: &str = "openai";

    /// An [`AnswerGenerator`] backed by the OpenAI chat completions API.
    ///
    /// The response shape is validated with optional fields rather than
    /// indexed into: a reply without `choices[0].message.content` fails with
    /// a [`RagError::GenerationError`] instead of yielding an empty answer.
    pub struct OpenAIChatGenerator {
        client: reqwest::Client,
        api_key: String,
        model: String,
        url: String,
    }

    impl OpenAIChatGenerator {
        /// Create a new generator with the given API key and per-request timeout.
        pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
            let api_key = api_key.into();
            if api_key.is_empty() {
                return Err(RagError::GenerationError {
                    provider: PROVIDER.into(),
                    message: "API key must not be empty".into(),
                });
            }

            let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
                RagError::GenerationError {
                    provider: PROVIDER.into(),
                    message: format!("failed to build HTTP client: {e}"),
                }
            })?;

            Ok(Self {
                client,
                api_key,
                model: DEFAULT_MODEL.into(),
                url: OPENAI_CHAT_URL.into(),
            })
        }

        /// Create a new generator using the `OPENAI_API_KEY` environment variable.
        pub fn from_env(timeout: Duration) -> Result<Self> {
            let api_key =
                std::env::var("OPENAI_API_KEY").map_err(|_| RagError::GenerationError {
                    provider: PROVIDER.into(),
                    message: "OPENAI_API_KEY environment variable not set".into(),
                })?;
            Self::new(api_key, timeout)
        }

        /// Set the model name (e.g. `gpt-4o-mini`).
        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        /// Point the generator at an OpenAI-compatible endpoint.
        pub fn with_url(mut self, url: impl Into<String>) -> Self {
            self.url = url.into();
            self
        }
    }

    // ── OpenAI API request/response types ──────────────────────────────

    #[derive(Serialize)]
    struct ChatMessage<'a> {
        role: &'a str,
        content: String,
    }

    #[derive(Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: Vec<ChatMessage<'a>>,
    }

    #[derive(Deserialize)]
    struct ChatResponse {
        #[serde(default)]
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: Option<ResponseMessage>,
    }

    #[derive(Deserialize)]
    struct ResponseMessage {
        content: Option<String>,
    }

    #[derive(Deserialize)]
    struct ErrorResponse {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    #[async_trait]
    impl AnswerGenerator for OpenAIChatGenerator {
        fn name(&self) -> &str {
            PROVIDER
        }

        async fn generate(&self, context: &str, question: &str) -> Result<String> {
            debug!(
                provider = PROVIDER,
                model = %self.model,
                context_len = context.len(),
                "generating answer"
            );

            let request_body = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
                    ChatMessage { role: "user", content: build_user_prompt(context, question) },
                ],
            };

            let response = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
                .map_err(|e| {
                    error!(provider = PROVIDER, error = %e, "request failed");
                    RagError::GenerationError {
                        provider: PROVIDER.into(),
                        message: format!("request failed: {e}"),
                    }
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let detail = serde_json::from_str::<ErrorResponse>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);

                error!(provider = PROVIDER, %status, "API error");
                return Err(RagError::GenerationError {
                    provider: PROVIDER.into(),
                    message: format!("API returned {status}: {detail}"),
                });
            }

            let chat_response: ChatResponse = response.json().await.map_err(|e| {
                error!(provider = PROVIDER, error = %e, "failed to parse response");
                RagError::GenerationError {
                    provider: PROVIDER.into(),
                    message: format!("failed to parse response: {e}"),
                }
            })?;

            chat_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message)
                .and_then(|message| message.content)
                .ok_or_else(|| {
                    error!(provider = PROVIDER, "response missing message content");
                    RagError::GenerationError {
                        provider: PROVIDER.into(),
                        message: "response missing choices[0].message.content".into(),
                    }
                })
        }
    }
}
