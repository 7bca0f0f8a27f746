//! SQLite-based knowledge store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large corpora consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{AnalysisRecord, ChunkStore, KnowledgeChunk, ResultStore, SourceSummary, SourceType};
use crate::error::{FormcheckError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// SQLite-based chunk and result store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS knowledge_chunks (
        id TEXT PRIMARY KEY,
        chunk_text TEXT NOT NULL,
        embedding BLOB NOT NULL,
        source_id TEXT NOT NULL,
        source_type TEXT NOT NULL,
        metadata_json TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_source_id ON knowledge_chunks(source_id);

    CREATE TABLE IF NOT EXISTS analysis_results (
        video_id TEXT PRIMARY KEY,
        video_title TEXT NOT NULL,
        analysis_json TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite knowledge store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FormcheckError::Store(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }
}

#[async_trait]
impl ChunkStore for SqliteStore {
    #[instrument(skip(self, chunk), fields(source_id = %chunk.source_id))]
    async fn insert_chunk(&self, chunk: &KnowledgeChunk) -> Result<()> {
        let conn = self.lock_conn()?;

        let embedding_bytes = Self::embedding_to_bytes(&chunk.embedding);
        let metadata_json = serde_json::to_string(&chunk.metadata)?;

        conn.execute(
            r#"
            INSERT INTO knowledge_chunks
            (id, chunk_text, embedding, source_id, source_type, metadata_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                chunk.id.to_string(),
                chunk.text,
                embedding_bytes,
                chunk.source_id,
                chunk.source_type.to_string(),
                metadata_json,
                chunk.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted chunk {}", chunk.id);
        Ok(())
    }

    async fn has_source(&self, source_id: &str) -> Result<bool> {
        let conn = self.lock_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM knowledge_chunks WHERE source_id = ?1",
            params![source_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn load_all(&self) -> Result<Vec<KnowledgeChunk>> {
        let conn = self.lock_conn()?;

        // rowid order matches insertion order, which keeps tie-breaking in
        // the retrieval sort deterministic.
        let mut stmt = conn.prepare(
            r#"
            SELECT id, chunk_text, embedding, source_id, source_type, metadata_json, created_at
            FROM knowledge_chunks
            ORDER BY rowid
            "#,
        )?;

        let chunks = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(2)?;
            let source_type_str: String = row.get(4)?;
            let metadata_str: String = row.get(5)?;
            let created_at_str: String = row.get(6)?;

            Ok(KnowledgeChunk {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                text: row.get(1)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                source_id: row.get(3)?,
                source_type: source_type_str
                    .parse()
                    .unwrap_or(SourceType::ResearchPaper),
                metadata: serde_json::from_str(&metadata_str)
                    .unwrap_or(serde_json::Value::Null),
                created_at: Self::parse_timestamp(&created_at_str),
            })
        })?;

        let result: Vec<KnowledgeChunk> = chunks.filter_map(|c| c.ok()).collect();
        debug!("Loaded {} chunks", result.len());
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<SourceSummary>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source_id, source_type, COUNT(*) as chunk_count, MIN(created_at) as created_at
            FROM knowledge_chunks
            GROUP BY source_id
            ORDER BY created_at DESC
            "#,
        )?;

        let sources = stmt.query_map([], |row| {
            let source_type_str: String = row.get(1)?;
            let created_at_str: String = row.get(3)?;
            Ok(SourceSummary {
                source_id: row.get(0)?,
                source_type: source_type_str
                    .parse()
                    .unwrap_or(SourceType::ResearchPaper),
                chunk_count: row.get(2)?,
                created_at: Self::parse_timestamp(&created_at_str),
            })
        })?;

        Ok(sources.filter_map(|s| s.ok()).collect())
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self.lock_conn()?;

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM knowledge_chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    #[instrument(skip(self, record), fields(video_id = %record.video_id))]
    async fn insert_result(&self, record: &AnalysisRecord) -> Result<()> {
        let conn = self.lock_conn()?;

        // First write wins: a concurrent insert for the same video resolves
        // as success rather than a constraint error.
        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO analysis_results (video_id, video_title, analysis_json, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.video_id,
                record.video_title,
                record.analysis_json,
                record.created_at.to_rfc3339(),
            ],
        )?;

        if inserted == 0 {
            debug!("Analysis result for {} already exists", record.video_id);
        } else {
            info!("Stored analysis result for {}", record.video_id);
        }
        Ok(())
    }

    async fn get_result(&self, video_id: &str) -> Result<Option<AnalysisRecord>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            r#"
            SELECT video_id, video_title, analysis_json, created_at
            FROM analysis_results
            WHERE video_id = ?1
            "#,
            params![video_id],
            |row| {
                let created_at_str: String = row.get(3)?;
                Ok(AnalysisRecord {
                    video_id: row.get(0)?,
                    video_title: row.get(1)?,
                    analysis_json: row.get(2)?,
                    created_at: Self::parse_timestamp(&created_at_str),
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn has_result(&self, video_id: &str) -> Result<bool> {
        let conn = self.lock_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM analysis_results WHERE video_id = ?1",
            params![video_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, embedding: Vec<f32>, source_id: &str) -> KnowledgeChunk {
        KnowledgeChunk::new(
            text.to_string(),
            embedding,
            source_id.to_string(),
            SourceType::Video,
            serde_json::json!({ "chunk_index": 0 }),
        )
    }

    #[tokio::test]
    async fn test_chunk_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();

        let original = chunk("Train to failure sparingly", vec![0.25, -1.5, 3.0], "vid1");
        store.insert_chunk(&original).await.unwrap();

        assert!(store.has_source("vid1").await.unwrap());
        assert!(!store.has_source("vid2").await.unwrap());
        assert_eq!(store.chunk_count().await.unwrap(), 1);

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, original.id);
        assert_eq!(loaded[0].text, original.text);
        assert_eq!(loaded[0].embedding, original.embedding);
        assert_eq!(loaded[0].source_type, SourceType::Video);
        assert_eq!(loaded[0].metadata["chunk_index"], 0);
    }

    #[tokio::test]
    async fn test_load_all_preserves_insertion_order() {
        let store = SqliteStore::in_memory().unwrap();

        for i in 0..5 {
            store
                .insert_chunk(&chunk(&format!("chunk {}", i), vec![i as f32], "vid1"))
                .await
                .unwrap();
        }

        let loaded = store.load_all().await.unwrap();
        let texts: Vec<&str> = loaded.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["chunk 0", "chunk 1", "chunk 2", "chunk 3", "chunk 4"]);
    }

    #[tokio::test]
    async fn test_list_sources() {
        let store = SqliteStore::in_memory().unwrap();

        store.insert_chunk(&chunk("a", vec![1.0], "vid1")).await.unwrap();
        store.insert_chunk(&chunk("b", vec![1.0], "vid1")).await.unwrap();
        store
            .insert_chunk(&KnowledgeChunk::new(
                "c".to_string(),
                vec![1.0],
                "paper.pdf".to_string(),
                SourceType::ResearchPaper,
                serde_json::json!({ "chunk_index": 0 }),
            ))
            .await
            .unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 2);
        let vid = sources.iter().find(|s| s.source_id == "vid1").unwrap();
        assert_eq!(vid.chunk_count, 2);
        assert_eq!(vid.source_type, SourceType::Video);
    }

    #[tokio::test]
    async fn test_result_insert_is_first_write_wins() {
        let store = SqliteStore::in_memory().unwrap();

        let first = AnalysisRecord::new("vid1".into(), "Leg Day".into(), "{\"v\":1}".into());
        let second = AnalysisRecord::new("vid1".into(), "Leg Day".into(), "{\"v\":2}".into());

        store.insert_result(&first).await.unwrap();
        store.insert_result(&second).await.unwrap();

        let stored = store.get_result("vid1").await.unwrap().unwrap();
        assert_eq!(stored.analysis_json, "{\"v\":1}");
        assert!(store.has_result("vid1").await.unwrap());
        assert!(!store.has_result("vid2").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_result_missing() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_result("nope").await.unwrap().is_none());
    }
}
