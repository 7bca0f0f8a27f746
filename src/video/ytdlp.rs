//! yt-dlp backed video information fetching.
//!
//! All subprocess invocations are bounded: a hung yt-dlp is killed and the
//! lookup degrades to a missing value instead of an error.

use super::{clean_vtt, parse_video_id, VideoFetcher, VideoInfo};
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Wall-clock bound for simple metadata queries.
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Wall-clock bound for caption downloads.
const CAPTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches video title, uploader, and captions via yt-dlp.
pub struct YtDlpFetcher {
    temp_dir: PathBuf,
}

impl YtDlpFetcher {
    /// Create a new fetcher that stores caption files under `temp_dir`.
    pub fn new(temp_dir: PathBuf) -> Self {
        Self { temp_dir }
    }

    /// Run a single-line metadata query (`--get-title`, `--get-uploader`).
    async fn query_line(&self, flag: &str, url: &str) -> Option<String> {
        let mut command = Command::new("yt-dlp");
        command.arg(flag).arg(url);

        let (status, stdout) = run_bounded(command, METADATA_TIMEOUT).await?;
        if !status.success() {
            warn!("yt-dlp {} exited with {}", flag, status);
            return None;
        }

        stdout
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
    }

    /// Download auto-generated captions and reduce them to plain text.
    ///
    /// Any failure along the way yields an empty transcript.
    async fn fetch_transcript(&self, video_id: &str, url: &str) -> String {
        let template = self.temp_dir.join(format!("{}.%(ext)s", video_id));

        let mut command = Command::new("yt-dlp");
        command
            .arg("--write-auto-sub")
            .arg("--sub-format")
            .arg("vtt")
            .arg("--skip-download")
            .arg("--output")
            .arg(template.as_os_str())
            .arg(url);

        let Some((status, _)) = run_bounded(command, CAPTION_TIMEOUT).await else {
            return String::new();
        };
        if !status.success() {
            warn!("yt-dlp caption download exited with {}", status);
            return String::new();
        }

        let vtt_path = self.temp_dir.join(format!("{}.en.vtt", video_id));
        let content = match std::fs::read_to_string(&vtt_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("No caption file at {:?}: {}", vtt_path, e);
                return String::new();
            }
        };
        let _ = std::fs::remove_file(&vtt_path);

        clean_vtt(&content)
    }
}

#[async_trait]
impl VideoFetcher for YtDlpFetcher {
    #[instrument(skip(self), fields(url = %video_url))]
    async fn fetch_video_info(&self, video_url: &str) -> Result<VideoInfo> {
        let video_id = parse_video_id(video_url)?;
        std::fs::create_dir_all(&self.temp_dir)?;

        let title = self.query_line("--get-title", video_url).await;
        let channel = self.query_line("--get-uploader", video_url).await;
        let transcript = self.fetch_transcript(&video_id, video_url).await;

        info!(
            video_id = %video_id,
            transcript_chars = transcript.len(),
            "Fetched video info"
        );

        Ok(VideoInfo {
            title,
            channel,
            transcript,
        })
    }
}

/// Run a command with a wall-clock bound.
///
/// On timeout the child is killed and `None` is returned; spawn failures
/// (including a missing binary) also return `None`.
async fn run_bounded(
    mut command: Command,
    limit: Duration,
) -> Option<(std::process::ExitStatus, String)> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("yt-dlp not found on PATH");
            return None;
        }
        Err(e) => {
            warn!("Failed to spawn yt-dlp: {}", e);
            return None;
        }
    };

    let mut stdout = child.stdout.take();

    let bounded = tokio::time::timeout(limit, async {
        let mut buf = String::new();
        if let Some(out) = stdout.as_mut() {
            let _ = out.read_to_string(&mut buf).await;
        }
        (child.wait().await, buf)
    })
    .await;

    match bounded {
        Ok((Ok(status), buf)) => Some((status, buf)),
        Ok((Err(e), _)) => {
            warn!("yt-dlp wait failed: {}", e);
            None
        }
        Err(_) => {
            warn!("yt-dlp timed out after {:?}, killing", limit);
            let _ = child.start_kill();
            let _ = child.wait().await;
            None
        }
    }
}
