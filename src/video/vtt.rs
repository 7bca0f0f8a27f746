//! WebVTT caption cleaning.

use regex::Regex;
use std::sync::OnceLock;

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{2}:\d{2}:\d{2}\.\d{3} --> \d{2}:\d{2}:\d{2}\.\d{3}$")
            .expect("Invalid regex")
    })
}

fn cue_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("Invalid regex"))
}

/// Reduce a WebVTT caption file to plain transcript text.
///
/// Drops the `WEBVTT` header, blank lines, numeric cue identifiers, and
/// timestamp range lines; the remaining caption lines are joined with
/// single spaces.
pub fn clean_vtt(content: &str) -> String {
    let mut cleaned = String::new();

    for line in content.lines() {
        if line.starts_with("WEBVTT")
            || line.trim().is_empty()
            || timestamp_regex().is_match(line)
            || cue_id_regex().is_match(line)
        {
            continue;
        }

        cleaned.push_str(line);
        cleaned.push(' ');
    }

    cleaned.trim().to_string()
}
