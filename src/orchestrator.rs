//! End-to-end analysis coordination.
//!
//! Sequences paper ingestion, video ingestion, cache lookup, and synthesis
//! into one request-response operation.

use crate::analysis::{AnalysisReport, SynthesisEngine};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::generation::{Generator, OpenAIGenerator};
use crate::ingest::{ingest_papers, IngestionPipeline, PdfExtractor, PdfTextExtractor};
use crate::retrieval::{Retriever, ScoredChunk};
use crate::store::{
    AnalysisRecord, ChunkStore, ResultStore, SourceType, SqliteStore,
};
use crate::video::{parse_video_id, VideoFetcher, VideoInfo, YtDlpFetcher};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the formcheck pipeline.
pub struct Orchestrator {
    settings: Settings,
    fetcher: Arc<dyn VideoFetcher>,
    extractor: Arc<dyn PdfExtractor>,
    pipeline: IngestionPipeline,
    synthesis: SynthesisEngine,
    retriever: Retriever,
    chunk_store: Arc<dyn ChunkStore>,
    result_store: Arc<dyn ResultStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_file.as_deref().map(Path::new))?;

        let store = Arc::new(SqliteStore::new(&settings.sqlite_path())?);
        let chunk_store: Arc<dyn ChunkStore> = store.clone();
        let result_store: Arc<dyn ResultStore> = store;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::new(
            &settings.generation.model,
            settings.generation.temperature,
        ));
        let fetcher: Arc<dyn VideoFetcher> = Arc::new(YtDlpFetcher::new(settings.temp_dir()));
        let extractor: Arc<dyn PdfExtractor> = Arc::new(PdfTextExtractor::new());

        Ok(Self::with_components(
            settings,
            prompts,
            chunk_store,
            result_store,
            embedder,
            generator,
            fetcher,
            extractor,
        ))
    }

    /// Create an orchestrator with custom components.
    #[allow(clippy::too_many_arguments)]
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        chunk_store: Arc<dyn ChunkStore>,
        result_store: Arc<dyn ResultStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        fetcher: Arc<dyn VideoFetcher>,
        extractor: Arc<dyn PdfExtractor>,
    ) -> Self {
        let pipeline = IngestionPipeline::new(
            chunk_store.clone(),
            embedder.clone(),
            settings.chunking.max_chunk_chars,
        );
        let retriever = Retriever::new(chunk_store.clone(), embedder.clone());
        let synthesis = SynthesisEngine::new(
            Retriever::new(chunk_store.clone(), embedder),
            generator,
            prompts,
            settings.retrieval.context_chunks,
        );

        Self {
            settings,
            fetcher,
            extractor,
            pipeline,
            synthesis,
            retriever,
            chunk_store,
            result_store,
        }
    }

    /// Get a reference to the chunk store.
    pub fn chunk_store(&self) -> Arc<dyn ChunkStore> {
        self.chunk_store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Search the knowledge base directly.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        self.retriever.search(query, k).await
    }

    /// Run the full analysis for a video.
    ///
    /// Papers are rescanned on every call, even when a memoized result will
    /// be returned below; re-scans of already-ingested files cost only an
    /// existence check. A stored result is never refreshed by later runs.
    #[instrument(skip(self), fields(url = %video_url))]
    pub async fn run_analysis(
        &self,
        video_url: &str,
        papers_directory: Option<&Path>,
    ) -> Result<AnalysisReport> {
        let papers_dir = papers_directory
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.papers_dir());
        ingest_papers(&self.pipeline, self.extractor.as_ref(), &papers_dir).await?;

        let video_id = parse_video_id(video_url)?;

        if let Some(record) = self.result_store.get_result(&video_id).await? {
            info!("Analysis for video {} already exists, returning stored result", video_id);
            let report: AnalysisReport = serde_json::from_str(&record.analysis_json)?;
            return Ok(report);
        }

        let video_info = match self.fetcher.fetch_video_info(video_url).await {
            Ok(video_info) => video_info,
            Err(e) => {
                warn!("Video lookup failed, continuing without transcript: {}", e);
                VideoInfo::default()
            }
        };
        let video_title = video_info
            .title
            .clone()
            .unwrap_or_else(|| "Unknown Video".to_string());

        if video_info.transcript.trim().is_empty() {
            info!("No transcript available for video {}", video_id);
        } else {
            self.pipeline
                .ingest(&video_id, SourceType::Video, &video_info.transcript)
                .await?;
        }

        let report = self.synthesis.synthesize(&video_title).await?;

        let analysis_json = serde_json::to_string(&report)?;
        self.result_store
            .insert_result(&AnalysisRecord::new(video_id, video_title, analysis_json))
            .await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormcheckError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticEmbedder;

    #[async_trait]
    impl Embedder for StaticEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"good_points": ["keeps moving"], "bad_points": ["no warmup"],
                   "conclusion": "Fine", "actual_workout": "burpees",
                   "scientific_backing": "thin"}"#
                .to_string())
        }
    }

    struct StubFetcher {
        info: VideoInfo,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(info: VideoInfo) -> Self {
            Self {
                info,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VideoFetcher for StubFetcher {
        async fn fetch_video_info(&self, _video_url: &str) -> Result<VideoInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.info.clone())
        }
    }

    struct NoopExtractor;

    impl PdfExtractor for NoopExtractor {
        fn extract(&self, _path: &Path) -> Result<String> {
            Ok(String::new())
        }
    }

    struct Fixture {
        orchestrator: Orchestrator,
        store: Arc<MemoryStore>,
        generator: Arc<CountingGenerator>,
        fetcher: Arc<StubFetcher>,
    }

    fn fixture(info: VideoInfo) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(CountingGenerator::new());
        let fetcher = Arc::new(StubFetcher::new(info));

        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            store.clone(),
            store.clone(),
            Arc::new(StaticEmbedder),
            generator.clone(),
            fetcher.clone(),
            Arc::new(NoopExtractor),
        );

        Fixture {
            orchestrator,
            store,
            generator,
            fetcher,
        }
    }

    fn video_info(transcript: &str) -> VideoInfo {
        VideoInfo {
            title: Some("Full Body Blast".to_string()),
            channel: Some("FitLab".to_string()),
            transcript: transcript.to_string(),
        }
    }

    const URL: &str = "https://www.youtube.com/watch?v=abc123";

    #[tokio::test]
    async fn test_invalid_url_aborts() {
        let f = fixture(video_info(""));
        let result = f.orchestrator.run_analysis("https://example.com/v", None).await;
        assert!(matches!(result, Err(FormcheckError::InvalidInput(_))));
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_run_ingests_and_persists() {
        let f = fixture(video_info("Do squats daily. Rest well."));

        let report = f.orchestrator.run_analysis(URL, None).await.unwrap();

        assert_eq!(report.video_title, "Full Body Blast");
        assert_eq!(report.analysis.good_points, vec!["keeps moving"]);
        assert_eq!(report.analysis.workout_plan, "burpees");
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 5);
        assert!(f.store.has_source("abc123").await.unwrap());
        assert!(f.store.has_result("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_run_is_memoized() {
        let f = fixture(video_info("Do squats daily. Rest well."));

        let first = f.orchestrator.run_analysis(URL, None).await.unwrap();
        let second = f.orchestrator.run_analysis(URL, None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        // Cache hit: no extra generation and no second video lookup.
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 5);
        assert_eq!(f.fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_transcript_still_synthesizes() {
        let f = fixture(video_info(""));

        let report = f.orchestrator.run_analysis(URL, None).await.unwrap();

        assert!(!f.store.has_source("abc123").await.unwrap());
        assert_eq!(report.video_title, "Full Body Blast");
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_without_persisting() {
        struct FailingGenerator;

        #[async_trait]
        impl Generator for FailingGenerator {
            async fn generate(&self, _prompt: &str) -> Result<String> {
                Err(FormcheckError::OpenAI("provider unreachable".into()))
            }
        }

        let store = Arc::new(MemoryStore::new());
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            store.clone(),
            store.clone(),
            Arc::new(StaticEmbedder),
            Arc::new(FailingGenerator),
            Arc::new(StubFetcher::new(video_info("Squat deep. Lock out."))),
            Arc::new(NoopExtractor),
        );

        let result = orchestrator.run_analysis(URL, None).await;
        assert!(matches!(result, Err(FormcheckError::OpenAI(_))));
        // No partial result is memoized, but ingested chunks stay durable.
        assert!(!store.has_result("abc123").await.unwrap());
        assert!(store.has_source("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_title_degrades_to_unknown() {
        let f = fixture(VideoInfo::default());

        let report = f.orchestrator.run_analysis(URL, None).await.unwrap();
        assert_eq!(report.video_title, "Unknown Video");
    }
}
