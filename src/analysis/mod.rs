//! Analysis result types and generation response parsing.

mod synthesis;

pub use synthesis::SynthesisEngine;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The aggregated workout analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutAnalysis {
    /// Positive aspects of the workout.
    #[serde(default)]
    pub good_points: Vec<String>,
    /// Potential issues or concerns.
    #[serde(default)]
    pub bad_points: Vec<String>,
    /// Description of the actual exercises and routine.
    #[serde(default)]
    pub workout_plan: String,
    /// Overall assessment.
    #[serde(default)]
    pub conclusion: String,
    /// How well the workout is supported by research.
    #[serde(default)]
    pub scientific_backing: String,
}

/// The full analysis document for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Title of the analyzed video.
    pub video_title: String,
    /// The aggregated analysis.
    pub analysis: WorkoutAnalysis,
}

/// One sub-query's generation output, parsed at the boundary.
///
/// Every field is optional: the model may omit any of them, and a response
/// that fails to parse at all becomes the empty structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubQueryResponse {
    pub video_title: Option<String>,
    pub channel: Option<String>,
    pub good_points: Option<Vec<String>>,
    pub bad_points: Option<Vec<String>>,
    pub conclusion: Option<String>,
    pub actual_workout: Option<String>,
    pub scientific_backing: Option<String>,
}

/// Strip an optional Markdown code fence from a generation response.
fn strip_code_fence(response: &str) -> &str {
    let mut trimmed = response.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        trimmed = rest;
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix("```") {
        trimmed = rest;
    }
    trimmed.trim()
}

/// Parse a generation response into a [`SubQueryResponse`].
///
/// Parse failures are logged and yield the empty structure; a bad response
/// for one sub-query must never abort the run.
pub fn parse_sub_query_response(raw: &str) -> SubQueryResponse {
    let body = strip_code_fence(raw);
    match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Could not parse generation response as JSON ({}), using empty result", e);
            SubQueryResponse::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_and_bare_json_parse_identically() {
        let bare = r#"{"conclusion": "Solid routine", "good_points": ["compound lifts"]}"#;
        let fenced = format!("```json\n{}\n```", bare);
        let plain_fence = format!("```\n{}\n```", bare);

        for input in [bare.to_string(), fenced, plain_fence] {
            let parsed = parse_sub_query_response(&input);
            assert_eq!(parsed.conclusion.as_deref(), Some("Solid routine"));
            assert_eq!(parsed.good_points, Some(vec!["compound lifts".to_string()]));
        }
    }

    #[test]
    fn test_malformed_response_yields_empty_structure() {
        let parsed = parse_sub_query_response("I'm sorry, I can't produce JSON here.");
        assert!(parsed.good_points.is_none());
        assert!(parsed.conclusion.is_none());
        assert!(parsed.actual_workout.is_none());
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let parsed = parse_sub_query_response(r#"{"channel": "FitLab"}"#);
        assert_eq!(parsed.channel.as_deref(), Some("FitLab"));
        assert!(parsed.video_title.is_none());
        assert!(parsed.bad_points.is_none());
    }

    #[test]
    fn test_report_serialization_is_stable() {
        let report = AnalysisReport {
            video_title: "Leg Day Basics".to_string(),
            analysis: WorkoutAnalysis {
                good_points: vec!["full range of motion".to_string()],
                ..Default::default()
            },
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        // Re-serializing the deserialized value is byte-identical.
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }
}
