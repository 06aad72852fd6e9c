//! Mapping between `Job` and a `jobs` row.

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::path::PathBuf;

use crate::error::{RunFailure, RunWarning};
use crate::job::{expected_extension_for, Job, JobStatus, Source};

/// Columns selected by every job query, in row order.
pub(super) const JOB_COLUMNS: &str = "id, source, source_locator, referer, quality_spec, audio_only, \
    display_title, output_basename, basename_user_supplied, status, status_note, title_error, ready, \
    created_at, completed_at, elapsed_seconds, failure_json, warnings_json, final_path";

pub(super) fn job_from_row(row: &SqliteRow) -> Result<Job> {
    let id: i64 = row.get("id");
    let source_str: String = row.get("source");
    let source = Source::parse(&source_str)
        .with_context(|| format!("job {}: unknown source {:?}", id, source_str))?;
    let audio_only: bool = row.get("audio_only");
    let status_str: String = row.get("status");
    let elapsed: i64 = row.get("elapsed_seconds");

    let failure_json: Option<String> = row.get("failure_json");
    let failure = match failure_json.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            serde_json::from_str::<RunFailure>(s)
                .with_context(|| format!("job {}: bad failure_json", id))?,
        ),
        None => None,
    };
    let warnings_json: Option<String> = row.get("warnings_json");
    let warnings = match warnings_json.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => serde_json::from_str::<Vec<RunWarning>>(s)
            .with_context(|| format!("job {}: bad warnings_json", id))?,
        None => Vec::new(),
    };
    let final_path: Option<String> = row.get("final_path");

    Ok(Job {
        id,
        source,
        source_locator: row.get("source_locator"),
        referer: row.get("referer"),
        quality_spec: row.get("quality_spec"),
        audio_only,
        display_title: row.get("display_title"),
        output_basename: row.get("output_basename"),
        output_basename_is_user_supplied: row.get("basename_user_supplied"),
        status: JobStatus::from_str(&status_str),
        status_note: row.get("status_note"),
        progress: None,
        title_error: row.get("title_error"),
        ready_for_scheduling: row.get("ready"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
        elapsed_seconds: elapsed.max(0) as u64,
        failure,
        warnings,
        final_path: final_path.map(PathBuf::from),
        expected_extension: expected_extension_for(source, audio_only),
    })
}
