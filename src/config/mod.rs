//! Configuration module for formcheck.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnalysisPrompts, Prompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings, PaperSettings,
    PromptSettings, RetrievalSettings, Settings, StoreSettings,
};
