//! Cosine-similarity retrieval over the knowledge base.
//!
//! Exact brute-force search: every stored chunk is scored against the query
//! embedding on each call. No index, no source filtering.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::store::{cosine_similarity, ChunkStore, KnowledgeChunk};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: KnowledgeChunk,
    /// Cosine similarity to the query (higher is better).
    pub score: f64,
}

/// Retrieval engine over a chunk store.
pub struct Retriever {
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Create a new retriever.
    pub fn new(store: Arc<dyn ChunkStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Search for the `k` chunks most similar to `query`.
    ///
    /// Results are sorted descending by score; chunks with equal scores keep
    /// their insertion order.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let chunks = self.store.load_all().await?;
        let mut scored: Vec<ScoredChunk> = chunks
            .into_iter()
            .map(|chunk| {
                let score = cosine_similarity(&query_embedding, &chunk.embedding);
                ScoredChunk { chunk, score }
            })
            .collect();

        // sort_by is stable, so equal scores retain load order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!("Retrieved {} chunks", scored.len());
        Ok(scored)
    }
}
