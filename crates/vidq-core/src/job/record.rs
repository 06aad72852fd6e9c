//! The `Job` record and its state transitions.

use std::path::{Path, PathBuf};

use crate::error::{RunFailure, RunWarning};
use crate::naming;
use crate::parser::ProgressEvent;

use super::types::{
    JobId, JobKind, JobRequest, JobStatus, Source, AUDIO_EXTENSION, TITLE_PLACEHOLDER,
    VIDEO_EXTENSION,
};

/// One requested unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub source: Source,
    pub source_locator: String,
    pub referer: Option<String>,
    pub quality_spec: String,
    pub audio_only: bool,
    pub display_title: String,
    pub output_basename: String,
    pub output_basename_is_user_supplied: bool,
    pub status: JobStatus,
    /// Free-text annotation: progress caption while active, title-probe error while pending.
    pub status_note: Option<String>,
    /// Last parsed progress while active.
    pub progress: Option<ProgressEvent>,
    /// Set when the title probe failed; the job still runs under a fallback name.
    pub title_error: Option<String>,
    pub ready_for_scheduling: bool,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds; set when the job reaches a terminal status.
    pub completed_at: Option<i64>,
    pub elapsed_seconds: u64,
    pub failure: Option<RunFailure>,
    pub warnings: Vec<RunWarning>,
    /// Where the artifact was moved to, when the run produced one.
    pub final_path: Option<PathBuf>,
    pub(crate) expected_extension: &'static str,
}

impl Job {
    /// Builds a fresh record for `request`.
    ///
    /// Remote jobs without a user-supplied name start TITLE_PENDING and are not
    /// ready until the title probe resolves; everything else is ready at once.
    pub fn new(id: JobId, request: JobRequest, created_at: i64) -> Self {
        let source = request.source;
        let user_name = request
            .output_name
            .as_deref()
            .map(naming::sanitize_title)
            .filter(|s| !s.is_empty());
        let user_supplied = user_name.is_some();
        let audio_only = request.audio_only && source.is_remote();

        let (display_title, output_basename, ready) = match source.kind() {
            JobKind::LocalConvert => {
                let path = Path::new(&request.source_locator);
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| request.source_locator.clone());
                let stem = path
                    .file_stem()
                    .map(|n| naming::sanitize_title(&n.to_string_lossy()))
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| naming::fallback_basename(id));
                (file_name, user_name.unwrap_or(stem), true)
            }
            JobKind::RemoteFetch => match user_name {
                Some(name) => (name.clone(), name, true),
                None => (
                    TITLE_PLACEHOLDER.to_string(),
                    naming::fallback_basename(id),
                    false,
                ),
            },
        };

        Job {
            id,
            source,
            source_locator: request.source_locator,
            referer: request.referer.filter(|r| !r.trim().is_empty()),
            quality_spec: request.quality_spec,
            audio_only,
            display_title,
            output_basename,
            output_basename_is_user_supplied: user_supplied,
            status: if ready {
                JobStatus::Queued
            } else {
                JobStatus::TitlePending
            },
            status_note: None,
            progress: None,
            title_error: None,
            ready_for_scheduling: ready,
            created_at,
            completed_at: None,
            elapsed_seconds: 0,
            failure: None,
            warnings: Vec::new(),
            final_path: None,
            expected_extension: expected_extension_for(source, audio_only),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.source.kind()
    }

    /// ".mp3" for audio-only fetches, ".mp4" otherwise. Fixed at creation.
    pub fn expected_extension(&self) -> &'static str {
        self.expected_extension
    }

    /// `<output_basename><expected_extension>`.
    pub fn artifact_file_name(&self) -> String {
        format!("{}{}", self.output_basename, self.expected_extension)
    }

    /// True while a remote job still waits for its title probe.
    pub fn needs_title_probe(&self) -> bool {
        self.source.is_remote() && !self.output_basename_is_user_supplied && !self.ready_for_scheduling
    }

    /// Title probe succeeded: adopt the title and, unless the user named the file, derive the basename.
    pub fn apply_title(&mut self, title: &str) {
        self.display_title = title.to_string();
        if !self.output_basename_is_user_supplied {
            let sanitized = naming::sanitize_title(title);
            self.output_basename = if sanitized.is_empty() {
                naming::fallback_basename(self.id)
            } else {
                sanitized
            };
        }
        self.title_error = None;
        self.mark_ready();
    }

    /// Title probe failed: keep going under the fallback name, annotate the error.
    pub fn apply_title_failure(&mut self, error: &str) {
        if !self.output_basename_is_user_supplied {
            self.output_basename = naming::fallback_basename(self.id);
        }
        self.display_title = format!("Error fetching title: {}", error);
        self.title_error = Some(error.to_string());
        self.status_note = Some("title fetch failed; using fallback name".to_string());
        self.mark_ready();
    }

    fn mark_ready(&mut self) {
        self.ready_for_scheduling = true;
        if self.status == JobStatus::TitlePending {
            self.status = JobStatus::Queued;
        }
    }

    /// Promotion to the running set.
    pub fn mark_active(&mut self) {
        self.status = JobStatus::Active;
        self.elapsed_seconds = 0;
        self.progress = None;
        self.status_note = None;
    }

    /// Records a terminal outcome.
    pub fn finish(
        &mut self,
        status: JobStatus,
        completed_at: i64,
        elapsed_seconds: u64,
        failure: Option<RunFailure>,
        warnings: Vec<RunWarning>,
        final_path: Option<PathBuf>,
    ) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.completed_at = Some(completed_at);
        self.elapsed_seconds = elapsed_seconds;
        self.failure = failure;
        self.warnings = warnings;
        self.final_path = final_path;
        self.progress = None;
        self.status_note = None;
    }

    /// Resets a terminal job so it can be queued again.
    pub fn reset_for_retry(&mut self) {
        self.status = JobStatus::Queued;
        self.completed_at = None;
        self.elapsed_seconds = 0;
        self.failure = None;
        self.warnings.clear();
        self.final_path = None;
        self.progress = None;
        self.status_note = None;
        self.ready_for_scheduling = true;
    }
}

pub(crate) fn expected_extension_for(source: Source, audio_only: bool) -> &'static str {
    if source.is_remote() && audio_only {
        AUDIO_EXTENSION
    } else {
        VIDEO_EXTENSION
    }
}
