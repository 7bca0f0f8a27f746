//! Prompt templates for formcheck.
//!
//! Templates can be customized by pointing `prompts.custom_file` at a TOML
//! file; `{{variable}}` placeholders are substituted at render time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub analysis: AnalysisPrompts,
}


/// Prompt for the per-sub-query analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub template: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            template: r#"Based on the following context from research papers and video transcripts, analyze the fitness video:

Context:
{{context}}

Please provide a structured analysis in JSON format with the following fields:
- video_title: The title of the video
- channel: The channel name
- good_points: Array of positive aspects of the workout
- bad_points: Array of potential issues or concerns
- conclusion: Overall assessment
- actual_workout: Description of the actual exercises and routine
- scientific_backing: How well the workout is supported by research

Query: {{query}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, applying overrides from an optional custom TOML file.
    pub fn load(custom_file: Option<&Path>) -> crate::error::Result<Self> {
        match custom_file {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&content)?)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Render a template, substituting `{{key}}` placeholders.
    pub fn render(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut rendered = template.to_string();
        for (key, value) in vars {
            rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
        }
        rendered
    }
}
