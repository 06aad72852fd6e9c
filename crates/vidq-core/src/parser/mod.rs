//! Tool output parsing: one line of subprocess text in, at most one
//! normalized progress event out.
//!
//! Parsing is pure: the only state is the caller's `is_merging` flag, which
//! decides whether a phase-keyword line is a new phase entry or a repeat.
//! `LineParser` keeps that flag for the runner.

mod convert;
mod fetch;

use std::time::Duration;

use crate::error::ToolKind;

pub use convert::parse_convert_line;
pub use fetch::parse_fetch_line;

/// Which phase of the job a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Downloading,
    Converting,
    Merging,
}

/// Normalized progress signal extracted from one output line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub phase: Phase,
    /// Percentage in [0, 100]; `None` means indeterminate (spinner).
    pub percent: Option<f64>,
    /// Transfer speed (`512.00KiB/s`) or encode speed multiplier (`1.5x`).
    pub speed: Option<String>,
    pub eta: Option<String>,
    /// Encoded media duration so far (convert tool only).
    pub encoded: Option<Duration>,
}

impl ProgressEvent {
    pub(crate) fn indeterminate(phase: Phase) -> Self {
        Self {
            phase,
            percent: None,
            speed: None,
            eta: None,
            encoded: None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        self.percent.is_none()
    }

    /// Merging flag after this event has been applied.
    pub fn leaves_merging(&self) -> bool {
        self.phase != Phase::Downloading
    }

    /// Status caption shown next to the job.
    pub fn caption(&self) -> String {
        let unknown = "N/A";
        match (self.phase, self.percent) {
            (Phase::Downloading, Some(p)) => format!(
                "{:.1}% ({}, ETA {})",
                p,
                self.speed.as_deref().unwrap_or(unknown),
                self.eta.as_deref().unwrap_or(unknown)
            ),
            (Phase::Downloading, None) => "Downloading...".to_string(),
            (Phase::Merging, _) => "Converting/Merging...".to_string(),
            (Phase::Converting, _) => match self.encoded {
                Some(d) => format!(
                    "Converting... ({}, Speed: {})",
                    format_hms(d.as_secs()),
                    self.speed.as_deref().unwrap_or(unknown)
                ),
                None => "Converting...".to_string(),
            },
        }
    }
}

/// Parses one line of `tool` output given the current merging flag.
pub fn parse_line(tool: ToolKind, line: &str, is_merging: bool) -> Option<ProgressEvent> {
    match tool {
        ToolKind::Fetch => parse_fetch_line(line, is_merging),
        ToolKind::Convert => parse_convert_line(line, is_merging),
    }
}

/// Per-job parser state: the tool kind and the merging flag.
#[derive(Debug, Clone)]
pub struct LineParser {
    tool: ToolKind,
    is_merging: bool,
}

impl LineParser {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            tool,
            is_merging: false,
        }
    }

    pub fn is_merging(&self) -> bool {
        self.is_merging
    }

    /// Parses `line` and updates the merging flag from the emitted event.
    pub fn feed(&mut self, line: &str) -> Option<ProgressEvent> {
        let event = parse_line(self.tool, line, self.is_merging)?;
        self.is_merging = event.leaves_merging();
        Some(event)
    }
}

/// Formats seconds as `HH:MM:SS`.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests;
