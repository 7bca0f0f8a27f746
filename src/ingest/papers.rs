//! Research paper ingestion.
//!
//! Scans a directory for PDF files and feeds their extracted text through
//! the ingestion pipeline, keyed by file path.

use super::IngestionPipeline;
use crate::error::{FormcheckError, Result};
use crate::store::SourceType;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Trait for PDF text extraction.
pub trait PdfExtractor: Send + Sync {
    /// Extract plain text from a PDF file.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// PDF text extraction backed by the pdf-extract crate.
#[derive(Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }
}

impl PdfExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| FormcheckError::Ingestion(format!("PDF extraction failed for {:?}: {}", path, e)))
    }
}

/// Ingest every PDF in `dir` into the knowledge base.
///
/// A missing directory or one without PDFs is a logged no-op. A paper whose
/// text cannot be extracted is skipped with a warning; the rest of the
/// directory still ingests. Returns the number of newly stored chunks.
#[instrument(skip(pipeline, extractor))]
pub async fn ingest_papers(
    pipeline: &IngestionPipeline,
    extractor: &dyn PdfExtractor,
    dir: &Path,
) -> Result<usize> {
    if !dir.is_dir() {
        info!("Papers directory not found: {:?}", dir);
        return Ok(0);
    }

    let mut pdf_paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdf_paths.sort();

    if pdf_paths.is_empty() {
        info!("No PDF files found in {:?}", dir);
        return Ok(0);
    }

    info!("Found {} PDF files to process", pdf_paths.len());

    let mut stored = 0;
    for path in &pdf_paths {
        let source_id = path.to_string_lossy().to_string();

        let text = match extractor.extract(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping paper {:?}: {}", path, e);
                continue;
            }
        };

        stored += pipeline
            .ingest(&source_id, SourceType::ResearchPaper, &text)
            .await?;
    }

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::store::{ChunkStore, MemoryStore};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StaticEmbedder;

    #[async_trait]
    impl Embedder for StaticEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        fn dimensions(&self) -> usize {
            1
        }
    }

    /// Extractor that sidesteps real PDF parsing in tests.
    struct FakeExtractor;

    impl PdfExtractor for FakeExtractor {
        fn extract(&self, path: &Path) -> Result<String> {
            Ok(format!("Findings from {}.", path.display()))
        }
    }

    fn pipeline(store: Arc<MemoryStore>) -> IngestionPipeline {
        IngestionPipeline::new(store, Arc::new(StaticEmbedder), 1000)
    }

    #[tokio::test]
    async fn test_missing_directory_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());

        let stored = ingest_papers(&pipeline, &FakeExtractor, Path::new("/no/such/dir"))
            .await
            .unwrap();
        assert_eq!(stored, 0);
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_directory_without_pdfs_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a pdf").unwrap();

        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());

        let stored = ingest_papers(&pipeline, &FakeExtractor, dir.path()).await.unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn test_ingests_each_pdf_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hypertrophy.pdf"), b"%PDF-fake").unwrap();
        std::fs::write(dir.path().join("Volume.PDF"), b"%PDF-fake").unwrap();

        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());

        let first = ingest_papers(&pipeline, &FakeExtractor, dir.path()).await.unwrap();
        assert_eq!(first, 2);

        // Re-scan costs only existence checks.
        let second = ingest_papers(&pipeline, &FakeExtractor, dir.path()).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(store.chunk_count().await.unwrap(), 2);

        let sources = store.list_sources().await.unwrap();
        assert!(sources.iter().all(|s| s.source_type == SourceType::ResearchPaper));
    }
}
