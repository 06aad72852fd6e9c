//! Lines printed by the media-transcoding tool (ffmpeg stats output).

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use super::{Phase, ProgressEvent};

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"time=\s*(\d{2,}):(\d{2}):(\d{2})\.(\d{2})").expect("valid time regex")
    })
}

fn speed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"speed=\s*(\d+(?:\.\d+)?)x").expect("valid speed regex"))
}

/// Parses one convert-tool line.
///
/// The tool does not know the total duration here, so progress is always
/// indeterminate: the event carries the encoded duration and speed instead.
pub fn parse_convert_line(line: &str, is_merging: bool) -> Option<ProgressEvent> {
    if let Some(caps) = time_re().captures(line) {
        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
        let secs = field(1)?
            .checked_mul(3600)?
            .checked_add(field(2)? * 60)?
            .checked_add(field(3)?)?;
        let encoded = Duration::from_secs(secs).checked_add(Duration::from_millis(field(4)? * 10))?;
        let speed = speed_re()
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| format!("{}x", m.as_str()));
        return Some(ProgressEvent {
            phase: Phase::Converting,
            percent: None,
            speed,
            eta: None,
            encoded: Some(encoded),
        });
    }

    // Final summary line ("video:1234kB audio:..."), printed once encoding ends.
    let summary = line.contains("video:") || (line.contains("audio:") && line.contains("global headers"));
    if summary && !is_merging {
        return Some(ProgressEvent::indeterminate(Phase::Converting));
    }

    None
}
