//! `vidq history` – list finished jobs, or clear them with --clear.

use anyhow::Result;
use vidq_core::job::Job;
use vidq_core::parser::format_hms;
use vidq_core::store::JobStore;

fn history_row(job: &Job) -> String {
    let detail = match (&job.final_path, &job.failure) {
        (_, Some(f)) => f.to_string(),
        (Some(p), None) => p.display().to_string(),
        (None, None) => String::new(),
    };
    format!(
        "{:<6} {:<10} {:<9} {} {}",
        job.id,
        job.status.label(),
        format_hms(job.elapsed_seconds),
        job.display_title,
        detail
    )
    .trim_end()
    .to_string()
}

pub async fn run_history(store: &JobStore, clear: bool) -> Result<()> {
    if clear {
        let removed = store.clear_history().await?;
        println!("Cleared {removed} finished job(s)");
        return Ok(());
    }
    let jobs = store.load_history().await?;
    if jobs.is_empty() {
        println!("No finished jobs.");
        return Ok(());
    }
    println!("{:<6} {:<10} {:<9} {}", "ID", "STATUS", "ELAPSED", "TITLE");
    for j in &jobs {
        println!("{}", history_row(j));
        for w in &j.warnings {
            println!("       warning: {}", w);
        }
    }
    Ok(())
}
