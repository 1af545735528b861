//! Vector store trait for collection lifecycle, upsert, and similarity search.

use async_trait::async_trait;

use crate::document::{CollectionSpec, IndexedPoint, SearchResult};
use crate::error::Result;

/// A storage backend for vector embeddings with similarity search.
///
/// Implementations exclusively own collection schemas and point storage. All
/// methods are safe to call from concurrent pipeline invocations over a
/// shared handle.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist, or verify its schema if it
    /// does.
    ///
    /// Idempotent: calling twice with the same spec is a no-op the second
    /// time. Safe under concurrent startup — a creator that loses the race
    /// observes the existing collection and verifies its schema instead of
    /// failing.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::SchemaConflictError`](crate::error::RagError::SchemaConflictError)
    /// if the collection exists with a different vector size or distance
    /// metric, and [`RagError::VectorStoreError`](crate::error::RagError::VectorStoreError)
    /// on backend failure.
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<()>;

    /// Upsert points into a collection in one batch.
    ///
    /// Idempotent per point id: a point with an existing id is replaced. Any
    /// failure — including a batch that was only partially written — is
    /// reported as an error, never swallowed.
    async fn upsert(&self, collection: &str, points: &[IndexedPoint]) -> Result<()>;

    /// Search for up to `limit` points nearest to `query`, ordered by
    /// descending score under the collection's distance metric.
    ///
    /// When `with_payload` is false the returned results carry empty text.
    /// Tie order between equal scores is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::VectorStoreError`](crate::error::RagError::VectorStoreError)
    /// if the collection is missing or the query vector's dimension does not
    /// match the collection schema.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<SearchResult>>;
}
