//! Configuration for the retrieval pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::{CollectionSpec, DistanceMetric};
use crate::error::{RagError, Result};

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Name of the vector collection all documents are indexed into.
    pub collection: String,
    /// Fixed dimensionality of the collection's vectors.
    pub vector_size: usize,
    /// Similarity function used for search ranking.
    pub distance: DistanceMetric,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of trailing characters of each chunk re-included at the start
    /// of the next chunk.
    pub chunk_overlap: usize,
    /// Number of top results retrieved per question.
    pub top_k: usize,
    /// Upper bound on in-flight embedding calls during ingestion fan-out.
    pub max_concurrency: usize,
    /// Timeout applied to each remote call (embedding, search, generation).
    pub request_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: "university-docs".to_string(),
            vector_size: 1536,
            distance: DistanceMetric::Cosine,
            chunk_size: 512,
            chunk_overlap: 0,
            top_k: 4,
            max_concurrency: 8,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// The collection schema implied by this configuration.
    pub fn collection_spec(&self) -> CollectionSpec {
        CollectionSpec {
            name: self.collection.clone(),
            vector_size: self.vector_size,
            distance: self.distance,
        }
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the collection's vector dimensionality.
    pub fn vector_size(mut self, size: usize) -> Self {
        self.config.vector_size = size;
        self
    }

    /// Set the similarity function used for search ranking.
    pub fn distance(mut self, distance: DistanceMetric) -> Self {
        self.config.distance = distance;
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the upper bound on in-flight embedding calls during ingestion.
    pub fn max_concurrency(mut self, width: usize) -> Self {
        self.config.max_concurrency = width;
        self
    }

    /// Set the timeout applied to each remote call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `collection` is empty
    /// - `vector_size == 0`
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_concurrency == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.collection.is_empty() {
            return Err(RagError::ConfigError("collection name must not be empty".to_string()));
        }
        if self.config.vector_size == 0 {
            return Err(RagError::ConfigError("vector_size must be greater than zero".to_string()));
        }
        if self.config.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.max_concurrency == 0 {
            return Err(RagError::ConfigError(
                "max_concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
