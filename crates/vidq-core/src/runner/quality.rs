//! Quality presets, parsed from their display strings into typed settings.

use regex::Regex;
use std::sync::OnceLock;

fn height_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)p\b").expect("valid height regex"))
}

/// Format selection for remote fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteQuality {
    /// "Auto (Best available)": best video + best audio.
    Auto,
    /// "High Quality - 1080p", "Combined ... - 720p", ...: video and audio capped at a height.
    MaxHeight(u32),
    /// "Video Only ... 480p": video stream only, capped at a height.
    VideoOnly(u32),
    /// Anything else: let the tool choose.
    Unspecified,
}

impl RemoteQuality {
    pub fn parse(spec: &str) -> Self {
        let lower = spec.to_ascii_lowercase();
        if lower.contains("auto") {
            return RemoteQuality::Auto;
        }
        let height = height_re()
            .captures(spec)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        match height {
            Some(h) if lower.contains("video only") => RemoteQuality::VideoOnly(h),
            Some(h) => RemoteQuality::MaxHeight(h),
            None => RemoteQuality::Unspecified,
        }
    }

    /// Value of the fetch tool's `-f` flag, if any.
    pub fn format_selector(self) -> Option<String> {
        match self {
            RemoteQuality::Auto => Some("bestvideo+bestaudio/best".to_string()),
            RemoteQuality::MaxHeight(h) => Some(format!(
                "bestvideo[height<={h}]+bestaudio/best[height<={h}]"
            )),
            RemoteQuality::VideoOnly(h) => Some(format!("bestvideo[height<={h}]")),
            RemoteQuality::Unspecified => None,
        }
    }
}

/// Encoding settings for local conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalQuality {
    /// Stream copy of every stream; fails on codecs MP4 cannot hold.
    SameAsSource,
    /// H.264 re-encode at the given CRF.
    Encode { crf: u8 },
}

impl LocalQuality {
    pub const HIGH_CRF: u8 = 18;
    pub const MEDIUM_CRF: u8 = 23;
    pub const LOW_CRF: u8 = 28;

    /// "Same as source", "High/Medium/Low Quality MP4". Unknown presets encode at medium.
    pub fn parse(spec: &str) -> Self {
        let lower = spec.trim().to_ascii_lowercase();
        if lower == "same as source" {
            LocalQuality::SameAsSource
        } else if lower.starts_with("high") {
            LocalQuality::Encode { crf: Self::HIGH_CRF }
        } else if lower.starts_with("low") {
            LocalQuality::Encode { crf: Self::LOW_CRF }
        } else {
            LocalQuality::Encode {
                crf: Self::MEDIUM_CRF,
            }
        }
    }

    /// Convert tool arguments between the input and the output path.
    pub fn codec_args(self) -> Vec<String> {
        match self {
            LocalQuality::SameAsSource => ["-c:v", "copy", "-c:a", "copy", "-map", "0", "-y"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            LocalQuality::Encode { crf } => vec![
                "-preset".into(),
                "medium".into(),
                "-crf".into(),
                crf.to_string(),
                "-c:v".into(),
                "libx264".into(),
                "-c:a".into(),
                "aac".into(),
                "-b:a".into(),
                "128k".into(),
                "-y".into(),
            ],
        }
    }
}
