//! Knowledge store abstraction for formcheck.
//!
//! Provides trait-based interfaces for chunk and analysis result persistence.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Origin kind of a knowledge chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Video,
    ResearchPaper,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Video => write!(f, "video"),
            SourceType::ResearchPaper => write!(f, "research_paper"),
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "video" => Ok(SourceType::Video),
            "research_paper" => Ok(SourceType::ResearchPaper),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

/// A unit of retrievable knowledge: a text excerpt paired with its embedding.
///
/// Chunks are immutable once created; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Text content of this chunk.
    pub text: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Identifier of the origin document (video ID or paper path).
    pub source_id: String,
    /// Kind of origin document.
    pub source_type: SourceType,
    /// Open key-value metadata (at least the chunk index).
    pub metadata: serde_json::Value,
    /// When this chunk was created.
    pub created_at: DateTime<Utc>,
}

impl KnowledgeChunk {
    /// Create a new chunk.
    pub fn new(
        text: String,
        embedding: Vec<f32>,
        source_id: String,
        source_type: SourceType,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            embedding,
            source_id,
            source_type,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// A memoized analysis for one video.
///
/// At most one record exists per `video_id`; records are never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Video identifier (unique key).
    pub video_id: String,
    /// Video title for display.
    pub video_title: String,
    /// The analysis payload, serialized as JSON.
    pub analysis_json: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Create a new analysis record.
    pub fn new(video_id: String, video_title: String, analysis_json: String) -> Self {
        Self {
            video_id,
            video_title,
            analysis_json,
            created_at: Utc::now(),
        }
    }
}

/// Summary information about one ingested source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Source identifier.
    pub source_id: String,
    /// Kind of source.
    pub source_type: SourceType,
    /// Number of stored chunks.
    pub chunk_count: u32,
    /// When the source was first ingested.
    pub created_at: DateTime<Utc>,
}

/// Trait for chunk persistence implementations.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persist a single chunk.
    async fn insert_chunk(&self, chunk: &KnowledgeChunk) -> Result<()>;

    /// Check whether any chunk exists for the given source.
    async fn has_source(&self, source_id: &str) -> Result<bool>;

    /// Load every stored chunk, in insertion order.
    async fn load_all(&self) -> Result<Vec<KnowledgeChunk>>;

    /// List all ingested sources with their chunk counts.
    async fn list_sources(&self) -> Result<Vec<SourceSummary>>;

    /// Get the total number of stored chunks.
    async fn chunk_count(&self) -> Result<usize>;
}

/// Trait for analysis result persistence implementations.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert a result unless one already exists for the video.
    ///
    /// First write wins; a conflicting insert is treated as success.
    async fn insert_result(&self, record: &AnalysisRecord) -> Result<()>;

    /// Look up the stored result for a video.
    async fn get_result(&self, video_id: &str) -> Result<Option<AnalysisRecord>>;

    /// Check whether a result exists for a video.
    async fn has_result(&self, video_id: &str) -> Result<bool>;
}

/// Compute cosine similarity between two vectors.
///
/// Accumulates in f64; the denominator carries a small epsilon so a zero
/// vector scores 0.0 instead of dividing by zero. Vectors of mismatched
/// length are a caller error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "embedding dimensions must match");

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt() + 1e-10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identity() {
        let a = vec![0.5, -1.5, 2.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_symmetry() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-2.0, 0.5, 1.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_similarity_orthogonal_and_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);

        let c = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &c) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![1.0, 2.0, 3.0];
        let zero = vec![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
    }

    #[test]
    fn test_source_type_roundtrip() {
        for st in [SourceType::Video, SourceType::ResearchPaper] {
            let parsed: SourceType = st.to_string().parse().unwrap();
            assert_eq!(parsed, st);
        }
        assert!("podcast".parse::<SourceType>().is_err());
    }
}
