//! Sub-query synthesis over the knowledge base.
//!
//! Answers five fixed analytical questions against the retrieved context
//! and routes each answer into the aggregate analysis.

use super::{parse_sub_query_response, AnalysisReport, WorkoutAnalysis};
use crate::config::Prompts;
use crate::error::Result;
use crate::generation::Generator;
use crate::retrieval::{Retriever, ScoredChunk};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Which aggregate field a sub-query's response feeds.
#[derive(Debug, Clone, Copy)]
enum AggregateField {
    GoodPoints,
    BadPoints,
    WorkoutPlan,
    Conclusion,
    ScientificBacking,
}

/// The five fixed analytical sub-queries, in execution order.
const SUB_QUERIES: [(&str, AggregateField); 5] = [
    (
        "Find good points and positive aspects mentioned in the content",
        AggregateField::GoodPoints,
    ),
    (
        "Find bad points, criticisms, or negative aspects mentioned in the content",
        AggregateField::BadPoints,
    ),
    (
        "Extract workout plan, exercises, sets, and reps mentioned",
        AggregateField::WorkoutPlan,
    ),
    (
        "Write a conclusion summarizing the overall assessment",
        AggregateField::Conclusion,
    ),
    (
        "How well is the workout supported by research?",
        AggregateField::ScientificBacking,
    ),
];

/// Synthesis engine: retrieval plus generation per sub-query.
pub struct SynthesisEngine {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    context_chunks: usize,
}

impl SynthesisEngine {
    /// Create a new synthesis engine.
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn Generator>,
        prompts: Prompts,
        context_chunks: usize,
    ) -> Self {
        Self {
            retriever,
            generator,
            prompts,
            context_chunks,
        }
    }

    /// Run all sub-queries and assemble the analysis.
    ///
    /// Sub-queries run sequentially and independently; a response that fails
    /// to parse blanks only its own aggregate field.
    #[instrument(skip(self), fields(video_title = %video_title))]
    pub async fn synthesize(&self, video_title: &str) -> Result<AnalysisReport> {
        let mut analysis = WorkoutAnalysis::default();

        for (query, field) in SUB_QUERIES {
            let chunks = self.retriever.search(query, self.context_chunks).await?;
            let context = format_context(&chunks);

            let mut vars = HashMap::new();
            vars.insert("context".to_string(), context);
            vars.insert("query".to_string(), query.to_string());
            let prompt = self.prompts.render(&self.prompts.analysis.template, &vars);

            let raw = self.generator.generate(&prompt).await?;
            let parsed = parse_sub_query_response(&raw);

            match field {
                AggregateField::GoodPoints => {
                    analysis.good_points = parsed.good_points.unwrap_or_default();
                }
                AggregateField::BadPoints => {
                    analysis.bad_points = parsed.bad_points.unwrap_or_default();
                }
                AggregateField::WorkoutPlan => {
                    analysis.workout_plan = parsed.actual_workout.unwrap_or_default();
                }
                AggregateField::Conclusion => {
                    analysis.conclusion = parsed.conclusion.unwrap_or_default();
                }
                AggregateField::ScientificBacking => {
                    analysis.scientific_backing = parsed.scientific_backing.unwrap_or_default();
                }
            }

            debug!("Completed sub-query: {}", query);
        }

        Ok(AnalysisReport {
            video_title: video_title.to_string(),
            analysis,
        })
    }
}

/// Format retrieved chunks into the prompt context block.
fn format_context(chunks: &[ScoredChunk]) -> String {
    let mut context = String::new();
    for scored in chunks {
        context.push_str(&format!("Source: {}\n", scored.chunk.source_id));
        context.push_str(&format!("Type: {}\n", scored.chunk.source_type));
        context.push_str(&format!("Content: {}\n\n", scored.chunk.text));
    }
    context
}
