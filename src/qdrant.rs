//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using the
//! [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! This module is only available when the `qdrant` feature is enabled.

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpdateStatus,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::document::{CollectionSpec, DistanceMetric, IndexedPoint, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "qdrant";

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Collections are created with the spec's vector size and distance metric,
/// and an already-existing collection is verified against the spec rather
/// than assumed compatible. Point payloads carry the chunk text under the
/// `text` key.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store with the default URL (`http://localhost:6334`).
    pub fn default_url() -> Result<Self> {
        Self::new("http://localhost:6334")
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStoreError { backend: BACKEND.to_string(), message: e.to_string() }
    }

    fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
        }
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Fetch the live vector params of a collection and compare them against
    /// the requested spec.
    async fn verify_schema(&self, spec: &CollectionSpec) -> Result<()> {
        let info = self.client.collection_info(&spec.name).await.map_err(Self::map_err)?;

        let params = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|c| match c {
                VectorsConfigKind::Params(params) => Some(params),
                VectorsConfigKind::ParamsMap(_) => None,
            })
            .ok_or_else(|| RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!(
                    "collection '{}' has no single-vector params to verify",
                    spec.name
                ),
            })?;

        let expected_distance = Self::to_qdrant_distance(spec.distance);
        if params.size != spec.vector_size as u64 || params.distance() != expected_distance {
            return Err(RagError::SchemaConflictError {
                collection: spec.name.clone(),
                existing: format!(
                    "{} dims / {} distance",
                    params.size,
                    params.distance().as_str_name()
                ),
                requested: spec.describe(),
            });
        }

        debug!(collection = %spec.name, "qdrant collection schema verified");
        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        let exists = collections.collections.iter().any(|c| c.name == spec.name);

        if !exists {
            let create = self
                .client
                .create_collection(
                    CreateCollectionBuilder::new(&spec.name).vectors_config(
                        VectorParamsBuilder::new(
                            spec.vector_size as u64,
                            Self::to_qdrant_distance(spec.distance),
                        ),
                    ),
                )
                .await;

            match create {
                Ok(_) => {
                    debug!(
                        collection = %spec.name,
                        vector_size = spec.vector_size,
                        "created qdrant collection"
                    );
                    return Ok(());
                }
                // A concurrent creator won the race; fall through and verify
                // that what it created matches our spec.
                Err(e) if e.to_string().contains("already exists") => {
                    debug!(collection = %spec.name, "lost creation race, verifying schema");
                }
                Err(e) => return Err(Self::map_err(e)),
            }
        }

        self.verify_schema(spec).await
    }

    async fn upsert(&self, collection: &str, points: &[IndexedPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let qdrant_points: Vec<PointStruct> = points
            .iter()
            .map(|point| {
                let payload = Payload::try_from(serde_json::json!({ "text": point.text }))
                    .map_err(|e| RagError::VectorStoreError {
                        backend: BACKEND.to_string(),
                        message: format!("failed to build payload: {e}"),
                    })?;
                Ok(PointStruct::new(point.id.to_string(), point.vector.clone(), payload))
            })
            .collect::<Result<_>>()?;

        let response = self
            .client
            .upsert_points(UpsertPointsBuilder::new(collection, qdrant_points).wait(true))
            .await
            .map_err(Self::map_err)?;

        if let Some(result) = response.result {
            if result.status() != UpdateStatus::Completed {
                return Err(RagError::VectorStoreError {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "upsert into '{collection}' finished with status {:?}",
                        result.status()
                    ),
                });
            }
        }

        debug!(collection, count = points.len(), "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, query.to_vec(), limit as u64)
                    .with_payload(with_payload),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                        None => None,
                    })
                    .unwrap_or_default();

                let text =
                    scored.payload.get("text").and_then(Self::extract_string).unwrap_or_default();

                SearchResult { id, score: scored.score, text }
            })
            .collect();

        debug!(collection, limit, "qdrant search completed");
        Ok(results)
    }
}
