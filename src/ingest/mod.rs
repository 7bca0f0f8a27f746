//! Ingestion pipeline: chunk, embed, and persist source documents.
//!
//! Ingestion is idempotent per source: once any chunk exists for a source
//! ID, the whole source is considered ingested and later calls are no-ops.

mod papers;

pub use papers::{ingest_papers, PdfExtractor, PdfTextExtractor};

use crate::chunking::chunk_text;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::store::{ChunkStore, KnowledgeChunk, SourceType};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Chunk + embed + persist pipeline with per-source dedup.
pub struct IngestionPipeline {
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn Embedder>,
    max_chunk_chars: usize,
    // Per-source locks close the gap between the existence check and the
    // inserts, so concurrent requests cannot double-ingest a source.
    source_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IngestionPipeline {
    /// Create a new pipeline.
    pub fn new(store: Arc<dyn ChunkStore>, embedder: Arc<dyn Embedder>, max_chunk_chars: usize) -> Self {
        Self {
            store,
            embedder,
            max_chunk_chars,
            source_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn source_lock(&self, source_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.source_locks.lock().await;
        locks
            .entry(source_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Ingest a source document.
    ///
    /// Returns the number of chunks stored: 0 when the source was already
    /// ingested or `raw_text` is empty (both deliberate no-ops). Chunks are
    /// embedded and persisted one at a time, so an upstream failure mid-run
    /// leaves a durable prefix behind.
    #[instrument(skip(self, raw_text), fields(source_id = %source_id, text_len = raw_text.len()))]
    pub async fn ingest(
        &self,
        source_id: &str,
        source_type: SourceType,
        raw_text: &str,
    ) -> Result<usize> {
        if raw_text.trim().is_empty() {
            debug!("Empty text for {}, nothing to ingest", source_id);
            return Ok(0);
        }

        let lock = self.source_lock(source_id).await;
        let _guard = lock.lock().await;

        if self.store.has_source(source_id).await? {
            debug!("Chunks for {} already exist, skipping ingestion", source_id);
            return Ok(0);
        }

        let chunks = chunk_text(raw_text, self.max_chunk_chars);
        info!("Created {} chunks for {}", chunks.len(), source_id);

        for (index, text) in chunks.iter().enumerate() {
            let embedding = self.embedder.embed(text).await?;
            let metadata = serde_json::json!({ "chunk_index": index });
            self.store
                .insert_chunk(&KnowledgeChunk::new(
                    text.clone(),
                    embedding,
                    source_id.to_string(),
                    source_type,
                    metadata,
                ))
                .await?;
        }

        info!("Stored {} chunks for {}", chunks.len(), source_id);
        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder returning a constant vector, counting calls.
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn pipeline() -> (IngestionPipeline, Arc<MemoryStore>, Arc<CountingEmbedder>) {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(CountingEmbedder::new());
        let pipeline = IngestionPipeline::new(store.clone(), embedder.clone(), 1000);
        (pipeline, store, embedder)
    }

    #[tokio::test]
    async fn test_ingest_stores_chunks_in_order() {
        let (pipeline, store, _) = pipeline();

        let count = pipeline
            .ingest("vid1", SourceType::Video, "First point. Second point.")
            .await
            .unwrap();
        assert_eq!(count, 1);

        let chunks = store.load_all().await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source_id, "vid1");
        assert_eq!(chunks[0].source_type, SourceType::Video);
        assert_eq!(chunks[0].metadata["chunk_index"], 0);
    }

    #[tokio::test]
    async fn test_ingest_twice_is_idempotent() {
        let (pipeline, store, embedder) = pipeline();
        let text = "Squats. Deadlifts. Bench press. Rows.";

        pipeline.ingest("vid1", SourceType::Video, text).await.unwrap();
        let after_first = store.chunk_count().await.unwrap();
        let embeds_after_first = embedder.calls.load(Ordering::SeqCst);

        let second = pipeline.ingest("vid1", SourceType::Video, text).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(store.chunk_count().await.unwrap(), after_first);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), embeds_after_first);
    }

    #[tokio::test]
    async fn test_ingest_empty_text_is_noop() {
        let (pipeline, store, _) = pipeline();

        assert_eq!(pipeline.ingest("vid1", SourceType::Video, "").await.unwrap(), 0);
        assert_eq!(pipeline.ingest("vid1", SourceType::Video, "   ").await.unwrap(), 0);
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_ingest_of_same_source_stores_once() {
        let (pipeline, store, _) = pipeline();
        let pipeline = Arc::new(pipeline);
        let text = "Lunges strengthen the legs. Planks work the core.";

        let a = {
            let p = pipeline.clone();
            tokio::spawn(async move { p.ingest("vid1", SourceType::Video, text).await })
        };
        let b = {
            let p = pipeline.clone();
            tokio::spawn(async move { p.ingest("vid1", SourceType::Video, text).await })
        };

        let (ra, rb) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        // Exactly one of the two calls does the work.
        assert_eq!(ra + rb, store.chunk_count().await.unwrap());
        assert!(ra == 0 || rb == 0);
    }

    #[tokio::test]
    async fn test_chunk_indices_are_sequential() {
        let store = Arc::new(MemoryStore::new());
        let pipeline =
            IngestionPipeline::new(store.clone(), Arc::new(CountingEmbedder::new()), 200);

        let sentence = "word ".repeat(30);
        let text = format!("{}. {}. {}.", sentence, sentence, sentence);

        let count = pipeline
            .ingest("paper.pdf", SourceType::ResearchPaper, &text)
            .await
            .unwrap();
        assert!(count > 1);

        let chunks = store.load_all().await.unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata["chunk_index"], i);
        }
    }
}
