//! In-memory knowledge store implementation.
//!
//! Useful for testing and small corpora.

use super::{AnalysisRecord, ChunkStore, KnowledgeChunk, ResultStore, SourceSummary};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory chunk and result store.
#[derive(Default)]
pub struct MemoryStore {
    chunks: RwLock<Vec<KnowledgeChunk>>,
    results: RwLock<HashMap<String, AnalysisRecord>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for MemoryStore {
    async fn insert_chunk(&self, chunk: &KnowledgeChunk) -> Result<()> {
        let mut chunks = self.chunks.write().unwrap();
        chunks.push(chunk.clone());
        Ok(())
    }

    async fn has_source(&self, source_id: &str) -> Result<bool> {
        let chunks = self.chunks.read().unwrap();
        Ok(chunks.iter().any(|c| c.source_id == source_id))
    }

    async fn load_all(&self) -> Result<Vec<KnowledgeChunk>> {
        let chunks = self.chunks.read().unwrap();
        Ok(chunks.clone())
    }

    async fn list_sources(&self) -> Result<Vec<SourceSummary>> {
        let chunks = self.chunks.read().unwrap();

        let mut summaries: Vec<SourceSummary> = Vec::new();
        for chunk in chunks.iter() {
            match summaries.iter_mut().find(|s| s.source_id == chunk.source_id) {
                Some(existing) => {
                    existing.chunk_count += 1;
                    if chunk.created_at < existing.created_at {
                        existing.created_at = chunk.created_at;
                    }
                }
                None => summaries.push(SourceSummary {
                    source_id: chunk.source_id.clone(),
                    source_type: chunk.source_type,
                    chunk_count: 1,
                    created_at: chunk.created_at,
                }),
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let chunks = self.chunks.read().unwrap();
        Ok(chunks.len())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn insert_result(&self, record: &AnalysisRecord) -> Result<()> {
        let mut results = self.results.write().unwrap();
        // First write wins, matching the SQLite store's conflict handling.
        results
            .entry(record.video_id.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn get_result(&self, video_id: &str) -> Result<Option<AnalysisRecord>> {
        let results = self.results.read().unwrap();
        Ok(results.get(video_id).cloned())
    }

    async fn has_result(&self, video_id: &str) -> Result<bool> {
        let results = self.results.read().unwrap();
        Ok(results.contains_key(video_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SourceType;

    #[tokio::test]
    async fn test_memory_store_chunks() {
        let store = MemoryStore::new();

        let chunk = KnowledgeChunk::new(
            "Progressive overload drives adaptation".to_string(),
            vec![1.0, 0.0],
            "vid1".to_string(),
            SourceType::Video,
            serde_json::json!({ "chunk_index": 0 }),
        );
        store.insert_chunk(&chunk).await.unwrap();

        assert!(store.has_source("vid1").await.unwrap());
        assert_eq!(store.chunk_count().await.unwrap(), 1);

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].chunk_count, 1);
    }

    #[tokio::test]
    async fn test_memory_store_results_first_write_wins() {
        let store = MemoryStore::new();

        let first = AnalysisRecord::new("vid1".into(), "A".into(), "first".into());
        let second = AnalysisRecord::new("vid1".into(), "A".into(), "second".into());

        store.insert_result(&first).await.unwrap();
        store.insert_result(&second).await.unwrap();

        let stored = store.get_result("vid1").await.unwrap().unwrap();
        assert_eq!(stored.analysis_json, "first");
    }
}
