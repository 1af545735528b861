//! Integration tests for the retrieval pipeline with mock collaborators.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use uni_rag::chunking::{BoundaryChunker, Chunker};
use uni_rag::document::{CollectionSpec, IndexedPoint, SearchResult};
use uni_rag::embedding::EmbeddingProvider;
use uni_rag::error::{RagError, Result};
use uni_rag::generation::AnswerGenerator;
use uni_rag::inmemory::InMemoryVectorStore;
use uni_rag::loader::DocumentLoader;
use uni_rag::pipeline::RagPipeline;
use uni_rag::vectorstore::VectorStore;
use uni_rag::{RagConfig, RagPipelineBuilder};

// ── Mock collaborators ─────────────────────────────────────────────

/// Treats the document payload as UTF-8 plain text.
struct Utf8Loader;

impl DocumentLoader for Utf8Loader {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RagError::ParseError(format!("invalid UTF-8 payload: {e}")))
    }
}

/// Deterministic bag-of-words embedder: texts sharing tokens get high cosine
/// similarity.
struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dims];
        for token in text.split_whitespace() {
            let token: String =
                token.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dims] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Reports `dims` but returns vectors one dimension too long.
struct WrongDimEmbedder {
    dims: usize,
}

#[async_trait]
impl EmbeddingProvider for WrongDimEmbedder {
    fn name(&self) -> &str {
        "wrong-dim"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; self.dims + 1])
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Returns the same vector for every input.
struct FixedEmbedder {
    vector: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// Tracks the high-water mark of concurrent in-flight embed calls.
struct CountingEmbedder {
    dims: usize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl CountingEmbedder {
    fn new(dims: usize) -> Self {
        Self { dims, in_flight: AtomicUsize::new(0), max_in_flight: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn name(&self) -> &str {
        "counting"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![1.0; self.dims])
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Always fails, standing in for an unreachable embedding service.
struct FailingEmbedder {
    dims: usize,
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "failing".into(),
            message: "connection refused".into(),
        })
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Records upserted points without storing anything searchable.
#[derive(Default)]
struct RecordingStore {
    upsert_calls: AtomicUsize,
    points: Mutex<Vec<IndexedPoint>>,
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn ensure_collection(&self, _spec: &CollectionSpec) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, _collection: &str, points: &[IndexedPoint]) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.points.lock().await.extend_from_slice(points);
        Ok(())
    }

    async fn search(
        &self,
        _collection: &str,
        _query: &[f32],
        _limit: usize,
        _with_payload: bool,
    ) -> Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

/// Echoes the context it was given, so tests can assert on prompt assembly.
struct EchoGenerator;

#[async_trait]
impl AnswerGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, context: &str, _question: &str) -> Result<String> {
        if context.is_empty() {
            Ok("I could not find relevant context.".to_string())
        } else {
            Ok(format!("Based on the context: {context}"))
        }
    }
}

fn base_config(vector_size: usize) -> RagConfig {
    RagConfig::builder()
        .collection("university-docs")
        .vector_size(vector_size)
        .top_k(4)
        .build()
        .unwrap()
}

// ── Ingestion ──────────────────────────────────────────────────────

#[tokio::test]
async fn index_document_produces_one_point_per_unit_with_distinct_ids() {
    let config = RagConfig::builder()
        .collection("university-docs")
        .vector_size(8)
        .chunk_size(16)
        .build()
        .unwrap();

    let text = "the quick brown fox jumps over the lazy dog again and again until dawn";
    let expected_units =
        BoundaryChunker::new(16, 0).unwrap().split(text).len();
    assert!(expected_units > 1);

    let store = Arc::new(RecordingStore::default());
    let pipeline = RagPipeline::builder()
        .config(config)
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(8)))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    let report = pipeline.index_document(text.as_bytes()).await.unwrap();
    assert_eq!(report.indexed, expected_units);

    let points = store.points.lock().await;
    assert_eq!(points.len(), expected_units);
    let ids: HashSet<_> = points.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), expected_units);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_document_indexes_nothing() {
    let store = Arc::new(RecordingStore::default());
    let pipeline = RagPipeline::builder()
        .config(base_config(8))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(8)))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    let report = pipeline.index_document(b"").await.unwrap();
    assert_eq!(report.indexed, 0);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dimension_mismatch_fails_before_any_upsert() {
    let store = Arc::new(RecordingStore::default());
    let pipeline = RagPipeline::builder()
        .config(base_config(8))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(WrongDimEmbedder { dims: 8 }))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    let err = pipeline.index_document(b"some document text").await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingError { .. }));
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn embedding_failure_propagates_to_caller() {
    let store = Arc::new(RecordingStore::default());
    let pipeline = RagPipeline::builder()
        .config(base_config(8))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(FailingEmbedder { dims: 8 }))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    let err = pipeline.index_document(b"some document text").await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingError { .. }));
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fan_out_never_exceeds_configured_width() {
    let config = RagConfig::builder()
        .collection("university-docs")
        .vector_size(8)
        .chunk_size(16)
        .max_concurrency(3)
        .build()
        .unwrap();

    // Enough words to produce far more units than the concurrency width.
    let text = (0..64).map(|i| format!("token{i:02}")).collect::<Vec<_>>().join(" ");

    let embedder = Arc::new(CountingEmbedder::new(8));
    let pipeline = RagPipeline::builder()
        .config(config)
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>)
        .store(Arc::new(RecordingStore::default()))
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    let report = pipeline.index_document(text.as_bytes()).await.unwrap();
    assert!(report.indexed > 3);
    assert!(embedder.max_in_flight.load(Ordering::SeqCst) <= 3);
}

// ── Question answering ─────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_answer_mentions_paris() {
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = RagPipeline::builder()
        .config(base_config(64))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(64)))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    pipeline.ensure_ready().await.unwrap();
    pipeline.index_document(b"Paris is the capital of France.").await.unwrap();

    let answer = pipeline.answer_question("What is the capital of France?").await.unwrap();
    assert!(answer.contains("Paris"), "answer should mention Paris: {answer}");
}

#[tokio::test]
async fn empty_collection_still_answers_without_error() {
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = RagPipeline::builder()
        .config(base_config(64))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(64)))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    pipeline.ensure_ready().await.unwrap();

    let answer = pipeline.answer_question("Anything indexed?").await.unwrap();
    assert_eq!(answer, "I could not find relevant context.");
}

#[tokio::test]
async fn context_preserves_rank_order_and_drops_empty_payloads() {
    use uuid::Uuid;

    let store = Arc::new(InMemoryVectorStore::new());
    store
        .ensure_collection(&CollectionSpec {
            name: "university-docs".to_string(),
            vector_size: 2,
            distance: uni_rag::DistanceMetric::Cosine,
        })
        .await
        .unwrap();

    // "first" is closest to the query, "second" further, the blank payload
    // sits in between and must be dropped from the context.
    store
        .upsert(
            "university-docs",
            &[
                IndexedPoint { id: Uuid::new_v4(), vector: vec![1.0, 0.0], text: "first".into() },
                IndexedPoint { id: Uuid::new_v4(), vector: vec![0.9, 0.2], text: "   ".into() },
                IndexedPoint { id: Uuid::new_v4(), vector: vec![0.6, 0.8], text: "second".into() },
            ],
        )
        .await
        .unwrap();

    let config = RagConfig::builder()
        .collection("university-docs")
        .vector_size(2)
        .build()
        .unwrap();
    let pipeline = RagPipeline::builder()
        .config(config)
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(FixedEmbedder { vector: vec![1.0, 0.0] }))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    let answer = pipeline.answer_question("which comes first?").await.unwrap();
    assert_eq!(answer, "Based on the context: first\n\nsecond");
}

#[tokio::test]
async fn retrieve_returns_ranked_texts_without_generation() {
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = RagPipeline::builder()
        .config(base_config(64))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(64)))
        .store(Arc::clone(&store) as Arc<dyn VectorStore>)
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    pipeline.ensure_ready().await.unwrap();
    pipeline.index_document(b"Paris is the capital of France.").await.unwrap();

    let texts = pipeline.retrieve("capital of France").await.unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Paris"));
}

// ── Startup & construction ─────────────────────────────────────────

#[tokio::test]
async fn ensure_ready_rejects_embedder_collection_dimension_mismatch() {
    let pipeline = RagPipeline::builder()
        .config(base_config(64))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(32)))
        .store(Arc::new(InMemoryVectorStore::new()))
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    let err = pipeline.ensure_ready().await.unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}

#[tokio::test]
async fn ensure_ready_is_idempotent() {
    let pipeline = RagPipeline::builder()
        .config(base_config(64))
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(64)))
        .store(Arc::new(InMemoryVectorStore::new()))
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap();

    pipeline.ensure_ready().await.unwrap();
    pipeline.ensure_ready().await.unwrap();
}

#[test]
fn builder_requires_all_collaborators() {
    let err = RagPipelineBuilder::default().config(base_config(8)).build().unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}

#[test]
fn builder_requires_config() {
    let err = RagPipelineBuilder::default()
        .loader(Arc::new(Utf8Loader))
        .embedder(Arc::new(HashEmbedder::new(8)))
        .store(Arc::new(InMemoryVectorStore::new()))
        .generator(Arc::new(EchoGenerator))
        .build()
        .unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}
