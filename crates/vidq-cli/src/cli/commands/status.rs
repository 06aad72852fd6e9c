//! `vidq status` – show jobs that have not finished (all jobs with --all).

use anyhow::Result;
use vidq_core::job::Job;
use vidq_core::parser::format_hms;
use vidq_core::store::JobStore;

/// One table row: id, status, elapsed, title and note.
pub fn status_row(job: &Job) -> String {
    let note = job
        .status_note
        .as_deref()
        .or(job.title_error.as_deref())
        .unwrap_or("");
    format!(
        "{:<6} {:<15} {:<9} {} {}",
        job.id,
        job.status.label(),
        format_hms(job.elapsed_seconds),
        job.display_title,
        note
    )
    .trim_end()
    .to_string()
}

pub async fn run_status(store: &JobStore, all: bool) -> Result<()> {
    let jobs = if all {
        store.list_jobs().await?
    } else {
        store.list_unfinished().await?
    };
    if jobs.is_empty() {
        println!("{}", if all { "No jobs." } else { "No queued or active jobs." });
    } else {
        println!("{:<6} {:<15} {:<9} {}", "ID", "STATUS", "ELAPSED", "TITLE");
        for j in &jobs {
            println!("{}", status_row(j));
        }
    }
    Ok(())
}
