//! Error types for the `uni-rag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document payload was malformed or of an unsupported format.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The chunking configuration was invalid.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// An error occurred while generating an embedding, including a returned
    /// vector whose length disagrees with the collection dimension.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A collection already exists with a schema different from the one requested.
    #[error("Schema conflict for collection '{collection}': existing {existing}, requested {requested}")]
    SchemaConflictError {
        /// The collection whose schema conflicts.
        collection: String,
        /// The schema the collection currently has.
        existing: String,
        /// The schema that was requested.
        requested: String,
    },

    /// The language model call failed or returned a response missing the
    /// expected content field.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for retrieval pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
