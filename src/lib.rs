//! # uni-rag
//!
//! Retrieval-augmented question answering over a document corpus.
//!
//! ## Overview
//!
//! The crate implements the retrieval pipeline of a document Q&A service:
//! PDF text extraction, boundary-aware chunking, embedding orchestration
//! with bounded fan-out, vector-store lifecycle management and similarity
//! search, and grounded answer generation.
//!
//! Every seam is a trait behind an `Arc` handle, injected into the
//! [`RagPipeline`] via its builder:
//!
//! - [`DocumentLoader`] — bytes → text ([`PdfLoader`](loader::PdfLoader) with feature `pdf`)
//! - [`Chunker`] — text → bounded, ordered [`TextUnit`]s
//! - [`EmbeddingProvider`] — text → fixed-dimension vector
//!   ([`EmbedServerProvider`](embed_server::EmbedServerProvider),
//!   [`OpenAIEmbeddingProvider`](openai::OpenAIEmbeddingProvider))
//! - [`VectorStore`] — collection schema, upsert, similarity search
//!   ([`InMemoryVectorStore`], [`QdrantVectorStore`](qdrant::QdrantVectorStore))
//! - [`AnswerGenerator`] — context + question → answer text
//!   ([`OpenAIChatGenerator`](generation::OpenAIChatGenerator))
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use uni_rag::generation::OpenAIChatGenerator;
//! use uni_rag::loader::PdfLoader;
//! use uni_rag::openai::OpenAIEmbeddingProvider;
//! use uni_rag::qdrant::QdrantVectorStore;
//! use uni_rag::{RagConfig, RagPipeline};
//!
//! let config = RagConfig::default();
//! let timeout = config.request_timeout;
//! let pipeline = RagPipeline::builder()
//!     .config(config)
//!     .loader(Arc::new(PdfLoader::new()))
//!     .embedder(Arc::new(OpenAIEmbeddingProvider::from_env(timeout)?))
//!     .store(Arc::new(QdrantVectorStore::default_url()?))
//!     .generator(Arc::new(OpenAIChatGenerator::from_env(timeout)?))
//!     .build()?;
//!
//! pipeline.ensure_ready().await?;
//! pipeline.index_document(&pdf_bytes).await?;
//! let answer = pipeline.answer_question("What is the capital of France?").await?;
//! ```
//!
//! ## Features
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `pdf` | PDF text extraction via `pdf-extract` |
//! | `qdrant` | Qdrant vector store backend |
//! | `openai` | OpenAI embeddings and chat completions |
//! | `embed-server` | Self-hosted `{text} → {embedding}` HTTP service |
//! | `full` | All of the above |

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
pub mod loader;
pub mod pipeline;
pub mod vectorstore;

#[cfg(feature = "embed-server")]
pub mod embed_server;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{BoundaryChunker, Chunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    CollectionSpec, DistanceMetric, IndexedPoint, IngestReport, SearchResult, TextUnit,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::AnswerGenerator;
pub use inmemory::InMemoryVectorStore;
pub use loader::DocumentLoader;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use vectorstore::VectorStore;
