//! Data types for text units, indexed points, and search results.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded, contiguous slice of a document's text — the unit of embedding
/// and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextUnit {
    /// The text content of the unit.
    pub text: String,
    /// Position of this unit within the source document, starting at zero.
    pub sequence_index: usize,
}

/// A record stored in a vector collection: a freshly generated id, the
/// embedding vector, and the raw chunk text as payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedPoint {
    /// Unique identifier, generated at indexing time.
    pub id: Uuid,
    /// The embedding vector. Must match the collection's vector size.
    pub vector: Vec<f32>,
    /// The raw text this vector was computed from.
    pub text: String,
}

/// The similarity function used to rank stored vectors against a query vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine similarity (higher is more similar).
    Cosine,
    /// Euclidean distance (lower is more similar; scores are negated so that
    /// descending order still means nearest-first).
    Euclidean,
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => write!(f, "Cosine"),
            DistanceMetric::Euclidean => write!(f, "Euclidean"),
        }
    }
}

/// The schema a collection is created with and verified against.
///
/// All points ever upserted into the collection must carry vectors of exactly
/// `vector_size` dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Collection name.
    pub name: String,
    /// Fixed dimensionality of every vector in the collection.
    pub vector_size: usize,
    /// Similarity function used for search ranking.
    pub distance: DistanceMetric,
}

impl CollectionSpec {
    /// Human-readable schema summary, used in conflict errors.
    pub fn describe(&self) -> String {
        format!("{} dims / {} distance", self.vector_size, self.distance)
    }
}

/// A retrieved point paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Identifier of the stored point.
    pub id: String,
    /// Similarity score under the collection's metric (higher is more relevant).
    pub score: f32,
    /// The stored payload text. Empty when the search was issued without payload.
    pub text: String,
}

/// Outcome of indexing a single document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of points written to the vector store.
    pub indexed: usize,
}
