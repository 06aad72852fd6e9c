//! Messages from job tasks back to the scheduler.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RunFailure, RunWarning};
use crate::job::{JobId, JobStatus};
use crate::parser::ProgressEvent;

/// Outcome of one run of the external tool.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// COMPLETED, FAILED or ABORTED.
    pub status: JobStatus,
    pub elapsed: Duration,
    pub failure: Option<RunFailure>,
    pub warnings: Vec<RunWarning>,
    pub final_path: Option<PathBuf>,
}

impl RunReport {
    pub fn completed(elapsed: Duration, final_path: Option<PathBuf>, warnings: Vec<RunWarning>) -> Self {
        Self {
            status: JobStatus::Completed,
            elapsed,
            failure: None,
            warnings,
            final_path,
        }
    }

    pub fn failed(elapsed: Duration, failure: RunFailure) -> Self {
        Self {
            status: JobStatus::Failed,
            elapsed,
            failure: Some(failure),
            warnings: Vec::new(),
            final_path: None,
        }
    }

    pub fn aborted(elapsed: Duration) -> Self {
        Self {
            status: JobStatus::Aborted,
            elapsed,
            failure: None,
            warnings: Vec::new(),
            final_path: None,
        }
    }
}

/// Everything a job task may report. Only the scheduler applies these to job state.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Title probe finished; `Err` carries the probe error text.
    TitleResolved {
        id: JobId,
        outcome: Result<String, String>,
    },
    /// One parsed progress line.
    Progress {
        id: JobId,
        progress: ProgressEvent,
        elapsed: Duration,
    },
    /// The external process is gone and the temp dir cleaned up.
    Finished { id: JobId, report: RunReport },
}

impl JobEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::TitleResolved { id, .. }
            | JobEvent::Progress { id, .. }
            | JobEvent::Finished { id, .. } => *id,
        }
    }
}
