//! Formcheck - Evidence-Based Fitness Video Analysis
//!
//! A CLI tool that answers one question: is this fitness video's workout any
//! good, and is it backed by research?
//!
//! # Overview
//!
//! Formcheck allows you to:
//! - Ingest a corpus of research papers (PDFs) into a local knowledge base
//! - Pull the transcript of a YouTube fitness video
//! - Run a retrieval-augmented analysis of the workout against the research
//! - Get a structured verdict: good points, bad points, the actual workout,
//!   a conclusion, and how well the routine is supported by science
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `video` - Video metadata and caption fetching (yt-dlp)
//! - `chunking` - Sentence-based text chunking
//! - `embedding` - Embedding generation
//! - `generation` - LLM text generation
//! - `store` - Knowledge chunk and analysis result persistence
//! - `retrieval` - Cosine-similarity search over the knowledge base
//! - `ingest` - Chunk + embed + persist pipeline with per-source dedup
//! - `analysis` - Sub-query synthesis and result aggregation
//! - `orchestrator` - End-to-end analysis coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use formcheck::config::Settings;
//! use formcheck::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let report = orchestrator
//!         .run_analysis("https://www.youtube.com/watch?v=dQw4w9WgXcQ", None)
//!         .await?;
//!     println!("{}", report.video_title);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod openai;
pub mod orchestrator;
pub mod retrieval;
pub mod store;
pub mod video;

pub use error::{FormcheckError, Result};
