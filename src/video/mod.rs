//! Video metadata and caption fetching.
//!
//! Provides YouTube URL parsing and a yt-dlp backed fetcher for video title,
//! channel, and transcript.

mod vtt;
mod ytdlp;

pub use vtt::clean_vtt;
pub use ytdlp::YtDlpFetcher;

use crate::error::{FormcheckError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Metadata and transcript for one video.
///
/// Title and channel are `None` when the upstream lookup failed or timed
/// out; the transcript is empty in the same degraded situations.
#[derive(Debug, Clone, Default)]
pub struct VideoInfo {
    /// Video title.
    pub title: Option<String>,
    /// Channel or uploader name.
    pub channel: Option<String>,
    /// Cleaned transcript text (empty when no captions were available).
    pub transcript: String,
}

/// Trait for video information providers.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    /// Fetch title, channel, and transcript for a video URL.
    ///
    /// Upstream failures and timeouts degrade to missing fields rather
    /// than erroring.
    async fn fetch_video_info(&self, video_url: &str) -> Result<VideoInfo>;
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([A-Za-z0-9_-]+)")
            .expect("Invalid regex")
    })
}

/// Extract the canonical video ID from a YouTube URL.
///
/// Accepts `.../watch?v=<id>` and `youtu.be/<id>` forms; the first match
/// wins. Anything else is invalid input.
pub fn parse_video_id(video_url: &str) -> Result<String> {
    video_id_regex()
        .captures(video_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FormcheckError::InvalidInput(format!("Invalid YouTube URL: {}", video_url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_url() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=abc123XYZ_-").unwrap(),
            "abc123XYZ_-"
        );
    }

    #[test]
    fn test_parse_short_url() {
        assert_eq!(parse_video_id("https://youtu.be/abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_parse_rejects_unrecognized_urls() {
        assert!(matches!(
            parse_video_id("https://example.com/v"),
            Err(FormcheckError::InvalidInput(_))
        ));
        assert!(parse_video_id("").is_err());
        assert!(parse_video_id("abc123").is_err());
    }

    #[test]
    fn test_parse_stops_at_non_id_characters() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").unwrap(),
            "dQw4w9WgXcQ"
        );
    }
}
