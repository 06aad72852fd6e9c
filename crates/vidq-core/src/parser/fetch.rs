//! Lines printed by the video-fetching tool (yt-dlp with `--newline`).

use regex::Regex;
use std::sync::OnceLock;

use super::{Phase, ProgressEvent};

/// Lowercase substrings that mark the post-download phase.
const MERGE_KEYWORDS: &[&str] = &[
    "merging formats",
    "[merger]",
    "postprocess",
    "extractaudio",
    "[videoconvertor]",
    "ffmpeg",
];

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%|^\[?[A-Za-z]+\]?\s+.*?(\d+(?:\.\d+)?)%\s+at\s")
            .expect("valid percent regex")
    })
}

fn speed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bat\s+(\d+(?:\.\d+)?\s?[KMGT]?i?B/s)").expect("valid speed regex")
    })
}

fn eta_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bETA\s+(\d{1,2}(?::\d{2}){1,2})").expect("valid eta regex"))
}

/// Parses one fetch-tool line.
///
/// A percentage wins over any phase keyword on the same line and always
/// leaves the merging phase. A merge keyword only produces an event when
/// not already merging.
pub fn parse_fetch_line(line: &str, is_merging: bool) -> Option<ProgressEvent> {
    if let Some(caps) = percent_re().captures(line) {
        let percent = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<f64>().ok())?;
        let speed = speed_re()
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let eta = eta_re()
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        return Some(ProgressEvent {
            phase: Phase::Downloading,
            percent: Some(percent.clamp(0.0, 100.0)),
            speed,
            eta,
            encoded: None,
        });
    }

    let lower = line.to_lowercase();
    if MERGE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        if is_merging {
            return None;
        }
        return Some(ProgressEvent::indeterminate(Phase::Merging));
    }

    if lower.contains("downloading") && !is_merging {
        return Some(ProgressEvent::indeterminate(Phase::Downloading));
    }

    None
}
