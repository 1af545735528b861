//! Self-hosted embedding server provider.
//!
//! Talks to an embedding service exposing `POST /embed` with a
//! `{ "text": ... }` request body and an `{ "embedding": [...] }` response.
//! Failed requests carry an `{ "error": ... }` body.
//!
//! This module is only available when the `embed-server` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "embed-server";

/// An [`EmbeddingProvider`] backed by a self-hosted HTTP embedding service.
///
/// The service's model is fixed at deploy time, so the expected vector
/// dimensionality is part of this provider's configuration (e.g. 384 for
/// `all-MiniLM-L6-v2`).
pub struct EmbedServerProvider {
    client: reqwest::Client,
    url: String,
    dimensions: usize,
}

impl EmbedServerProvider {
    /// Create a new provider for the given `/embed` endpoint URL.
    ///
    /// `dimensions` must match the vector size of the model the server runs.
    /// Every request is bound by `timeout`.
    pub fn new(url: impl Into<String>, dimensions: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;
        Ok(Self { client, url: url.into(), dimensions })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl EmbeddingProvider for EmbedServerProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding text");

        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::EmbeddingError {
                    provider: PROVIDER.into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = PROVIDER, %status, "embedding service error");
            return Err(RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("service returned {status}: {detail}"),
            });
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(parsed.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
