//! Error taxonomy shared by the runner, the title probe and the scheduler.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::job::JobId;

/// Which external program a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Fetch,
    Convert,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Fetch => "fetch",
            ToolKind::Convert => "convert",
        }
    }
}

/// Why a run ended in FAILED. Stored with the job so history can tell the categories apart.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum RunFailure {
    /// Binary missing or not executable. Not retried automatically.
    #[error("{tool} tool not found or not executable: {}", .program.display())]
    ToolNotFound { tool: String, program: PathBuf },
    /// Process exited with a non-zero code (or was killed by a signal).
    #[error("execution failed (exit code {})", .code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    ExecutionFailed { code: Option<i32> },
    /// Spawning or reading the process failed for another reason.
    #[error("i/o error while running tool: {message}")]
    Io { message: String },
}

impl RunFailure {
    /// Short diagnostic tag (`tool-not-found`, `execution-failed`, `io`).
    pub fn tag(&self) -> &'static str {
        match self {
            RunFailure::ToolNotFound { .. } => "tool-not-found",
            RunFailure::ExecutionFailed { .. } => "execution-failed",
            RunFailure::Io { .. } => "io",
        }
    }
}

/// Non-blocking notices attached to a COMPLETED job; they never change its status.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// The tool exited 0 but the expected artifact was not in the temp directory.
    #[error("tool reported success but {} was not found", .expected.display())]
    ArtifactMissing { expected: PathBuf },
    /// The artifact exists but could not be moved to the output directory.
    #[error("could not move {} to {}: {message}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },
}

/// Failure of the metadata-only title probe. Non-fatal for the job.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("fetch tool not found: {}", .0.display())]
    ToolNotFound(PathBuf),
    #[error("title probe exited with code {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("title probe returned no usable JSON")]
    Malformed,
    #[error("title probe timed out after {0}s")]
    Timeout(u64),
    #[error("title probe i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by scheduler operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job {0} is not failed or aborted; only those can be retried")]
    NotRetryable(JobId),
    #[error("job {0} is already known to the scheduler")]
    Duplicate(JobId),
}

/// A job request rejected before it reaches the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("empty source locator")]
    EmptyLocator,
    #[error("invalid URL {locator}: {reason}")]
    InvalidUrl { locator: String, reason: String },
    #[error("unsupported URL scheme {0:?} (only http and https)")]
    UnsupportedScheme(String),
    #[error("local file not found: {0}")]
    MissingFile(String),
    #[error("a referer is only used by the alt remote source")]
    RefererNotAllowed,
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_concurrent must be at least 1")]
    ZeroConcurrency,
    #[error("tick_interval_ms must be greater than 0")]
    ZeroTick,
    #[error("title_probe_timeout_secs must be greater than 0")]
    ZeroProbeTimeout,
}
