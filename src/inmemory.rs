//! In-memory vector store.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector
//! store backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is
//! suitable for development, testing, and small-scale use cases, and it
//! enforces the same schema rules as the remote backends.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{CollectionSpec, DistanceMetric, IndexedPoint, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "in-memory";

struct Collection {
    spec: CollectionSpec,
    points: HashMap<Uuid, IndexedPoint>,
}

/// An in-memory [`VectorStore`] with schema enforcement.
///
/// Each collection records the [`CollectionSpec`] it was created with;
/// conflicting re-creation, wrong-dimension upserts, and wrong-dimension
/// queries are rejected the way a remote store would reject them.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Score a stored vector against a query under the given metric.
///
/// Euclidean distances are negated so that descending score order always
/// means nearest-first.
fn score(metric: DistanceMetric, stored: &[f32], query: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Cosine => cosine_similarity(stored, query),
        DistanceMetric::Euclidean => {
            let dist: f32 =
                stored.iter().zip(query.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt();
            -dist
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let mut collections = self.collections.write().await;
        match collections.get(&spec.name) {
            Some(existing) if existing.spec == *spec => Ok(()),
            Some(existing) => Err(RagError::SchemaConflictError {
                collection: spec.name.clone(),
                existing: existing.spec.describe(),
                requested: spec.describe(),
            }),
            None => {
                collections.insert(
                    spec.name.clone(),
                    Collection { spec: spec.clone(), points: HashMap::new() },
                );
                Ok(())
            }
        }
    }

    async fn upsert(&self, collection: &str, points: &[IndexedPoint]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let stored = collections.get_mut(collection).ok_or_else(|| RagError::VectorStoreError {
            backend: BACKEND.to_string(),
            message: format!("collection '{collection}' does not exist"),
        })?;

        for point in points {
            if point.vector.len() != stored.spec.vector_size {
                return Err(RagError::VectorStoreError {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "point {} has {} dimensions, collection '{collection}' expects {}",
                        point.id,
                        point.vector.len(),
                        stored.spec.vector_size
                    ),
                });
            }
        }
        for point in points {
            stored.points.insert(point.id, point.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let stored = collections.get(collection).ok_or_else(|| RagError::VectorStoreError {
            backend: BACKEND.to_string(),
            message: format!("collection '{collection}' does not exist"),
        })?;

        if query.len() != stored.spec.vector_size {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!(
                    "query vector has {} dimensions, collection '{collection}' expects {}",
                    query.len(),
                    stored.spec.vector_size
                ),
            });
        }

        let metric = stored.spec.distance;
        let mut scored: Vec<SearchResult> = stored
            .points
            .values()
            .map(|point| SearchResult {
                id: point.id.to_string(),
                score: score(metric, &point.vector, query),
                text: if with_payload { point.text.clone() } else { String::new() },
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}
