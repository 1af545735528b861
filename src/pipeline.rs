//! Retrieval pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full ingest-and-answer workflow by
//! composing a [`DocumentLoader`], a [`Chunker`], an [`EmbeddingProvider`],
//! a [`VectorStore`], and an [`AnswerGenerator`]. It owns no persistent
//! state itself; all collaborators are injected handles.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uni_rag::{RagConfig, RagPipeline, InMemoryVectorStore};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .loader(Arc::new(my_loader))
//!     .embedder(Arc::new(my_embedder))
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! pipeline.ensure_ready().await?;
//! let report = pipeline.index_document(&pdf_bytes).await?;
//! let answer = pipeline.answer_question("What is the capital of France?").await?;
//! ```

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{error, info};
use uuid::Uuid;

use crate::chunking::{BoundaryChunker, Chunker};
use crate::config::RagConfig;
use crate::document::{IndexedPoint, IngestReport};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::AnswerGenerator;
use crate::loader::DocumentLoader;
use crate::vectorstore::VectorStore;

/// The retrieval pipeline orchestrator.
///
/// Coordinates document ingestion (extract → chunk → embed → store) and
/// question answering (embed → search → assemble context → generate).
/// Construct one via [`RagPipeline::builder()`]; a single pipeline is safe
/// to share across concurrent callers.
pub struct RagPipeline {
    config: RagConfig,
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn AnswerGenerator>,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Prepare the pipeline for traffic. Call once at process startup,
    /// before accepting ingestion or query requests.
    ///
    /// Verifies that the embedding provider's dimensionality matches the
    /// configured collection schema, then creates or verifies the collection.
    /// Safe to call from concurrently starting processes.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] on an embedder/collection dimension
    /// mismatch (e.g. a 384-dim model configured against a 1536-dim
    /// collection), or the store's error if collection creation fails.
    pub async fn ensure_ready(&self) -> Result<()> {
        let dims = self.embedder.dimensions();
        if dims != self.config.vector_size {
            return Err(RagError::ConfigError(format!(
                "embedding provider '{}' produces {dims}-dimension vectors but collection '{}' expects {}",
                self.embedder.name(),
                self.config.collection,
                self.config.vector_size
            )));
        }
        self.store.ensure_collection(&self.config.collection_spec()).await
    }

    /// Ingest a single document: extract text → chunk → embed → store.
    ///
    /// Text units are embedded concurrently, with at most
    /// `config.max_concurrency` embedding calls in flight. Every returned
    /// vector is checked against the collection dimension before anything is
    /// written, and all points are upserted in one batch, so a failing unit
    /// means no partial write.
    ///
    /// # Errors
    ///
    /// Propagates the originating component error unmodified. There is no
    /// catch-and-log path; callers always observe failure.
    pub async fn index_document(&self, bytes: &[u8]) -> Result<IngestReport> {
        let text = self.loader.extract_text(bytes)?;
        let units = self.chunker.split(&text);
        if units.is_empty() {
            info!(collection = %self.config.collection, "document produced no text units");
            return Ok(IngestReport { indexed: 0 });
        }

        let vectors: Vec<Vec<f32>> = stream::iter(units.iter().map(|unit| {
            let embedder = Arc::clone(&self.embedder);
            async move { embedder.embed(&unit.text).await }
        }))
        .buffered(self.config.max_concurrency)
        .try_collect()
        .await?;

        let expected = self.config.vector_size;
        for (unit, vector) in units.iter().zip(&vectors) {
            if vector.len() != expected {
                error!(
                    sequence_index = unit.sequence_index,
                    got = vector.len(),
                    expected,
                    "embedding dimension mismatch"
                );
                return Err(RagError::EmbeddingError {
                    provider: self.embedder.name().to_string(),
                    message: format!(
                        "unit {} embedded to {} dimensions, expected {expected}",
                        unit.sequence_index,
                        vector.len()
                    ),
                });
            }
        }

        let points: Vec<IndexedPoint> = units
            .into_iter()
            .zip(vectors)
            .map(|(unit, vector)| IndexedPoint { id: Uuid::new_v4(), vector, text: unit.text })
            .collect();

        self.store.upsert(&self.config.collection, &points).await?;

        info!(
            collection = %self.config.collection,
            indexed = points.len(),
            "indexed document"
        );
        Ok(IngestReport { indexed: points.len() })
    }

    /// Answer a question: embed → search → assemble context → generate.
    ///
    /// The top `config.top_k` results are retrieved with payload; results
    /// with empty text are dropped and the remainder joined in rank order
    /// with a blank line into the grounding context. Empty search results
    /// are not an error — generation still runs with an empty context.
    pub async fn answer_question(&self, question: &str) -> Result<String> {
        let query = self.embedder.embed(question).await?;
        let results =
            self.store.search(&self.config.collection, &query, self.config.top_k, true).await?;

        let context = results
            .iter()
            .map(|r| r.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        info!(
            collection = %self.config.collection,
            results = results.len(),
            context_len = context.len(),
            "retrieved context for question"
        );

        self.generator.generate(&context, question).await
    }

    /// Retrieve the ranked context texts for a question without generating
    /// an answer.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        let query = self.embedder.embed(question).await?;
        let results =
            self.store.search(&self.config.collection, &query, self.config.top_k, true).await?;
        Ok(results.into_iter().map(|r| r.text).collect())
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `loader`, `embedder`, `store`, and `generator` are required.
/// The chunker defaults to a [`BoundaryChunker`] built from the config's
/// `chunk_size`/`chunk_overlap`.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    loader: Option<Arc<dyn DocumentLoader>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document loader.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the text chunker. Optional; defaults to a [`BoundaryChunker`]
    /// derived from the configuration.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the answer generator.
    pub fn generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`RagPipeline`], validating that all required collaborators
    /// are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing,
    /// or [`RagError::ChunkingError`] if the default chunker cannot be built
    /// from the configuration.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let loader =
            self.loader.ok_or_else(|| RagError::ConfigError("loader is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| RagError::ConfigError("store is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;

        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(BoundaryChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(RagPipeline { config, loader, chunker, embedder, store, generator })
    }
}
