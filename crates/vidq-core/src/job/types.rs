//! Enums and small value types of the job record.

use serde::{Deserialize, Serialize};

/// Job identifier (assigned by the job store at creation, never reused).
pub type JobId = i64;

/// Extension of fetched video and of every local conversion.
pub const VIDEO_EXTENSION: &str = ".mp4";
/// Extension of audio-only fetches.
pub const AUDIO_EXTENSION: &str = ".mp3";

/// Placeholder title shown until the title probe resolves.
pub const TITLE_PLACEHOLDER: &str = "Fetching title...";

/// Which external tool and command shape a job uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    RemoteFetch,
    LocalConvert,
}

/// Where the input comes from.
///
/// The two remote providers differ in auth needs: only `AltRemote` sends a
/// referer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    PrimaryRemote,
    AltRemote,
    LocalFile,
}

impl Source {
    pub fn kind(self) -> JobKind {
        match self {
            Source::PrimaryRemote | Source::AltRemote => JobKind::RemoteFetch,
            Source::LocalFile => JobKind::LocalConvert,
        }
    }

    pub fn is_remote(self) -> bool {
        self.kind() == JobKind::RemoteFetch
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Source::PrimaryRemote => "primary_remote",
            Source::AltRemote => "alt_remote",
            Source::LocalFile => "local_file",
        }
    }

    /// Parses both the stored form (`primary_remote`) and the short CLI form (`primary`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary_remote" | "primary" | "default" => Some(Source::PrimaryRemote),
            "alt_remote" | "alt" => Some(Source::AltRemote),
            "local_file" | "local" => Some(Source::LocalFile),
            _ => None,
        }
    }
}

/// Job status as seen by the scheduler and stored in the job store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    TitlePending,
    Active,
    Completed,
    Failed,
    Aborted,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::TitlePending => "title_pending",
            JobStatus::Active => "active",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Aborted => "aborted",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "queued" => JobStatus::Queued,
            "title_pending" => JobStatus::TitlePending,
            "active" => JobStatus::Active,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "aborted" => JobStatus::Aborted,
            _ => JobStatus::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Aborted
        )
    }

    /// Only failed and aborted jobs may be re-queued.
    pub fn is_retryable(self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::Aborted)
    }

    /// Human label used by status rendering.
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::TitlePending => "Fetching title",
            JobStatus::Active => "Active",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
            JobStatus::Aborted => "Aborted",
        }
    }
}

/// User input describing a job to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub source: Source,
    /// URL for remote sources, filesystem path for local files.
    pub source_locator: String,
    /// Only used for `Source::AltRemote`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    pub quality_spec: String,
    #[serde(default)]
    pub audio_only: bool,
    /// Output file name without extension, if the user chose one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

impl JobRequest {
    pub fn remote(source: Source, url: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            source,
            source_locator: url.into(),
            referer: None,
            quality_spec: quality.into(),
            audio_only: false,
            output_name: None,
        }
    }

    pub fn local(path: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            source: Source::LocalFile,
            source_locator: path.into(),
            referer: None,
            quality_spec: quality.into(),
            audio_only: false,
            output_name: None,
        }
    }
}
