//! `vidq remove <id>` – remove a job record; optionally delete its file with --delete-file.

use anyhow::Result;
use vidq_core::job::JobId;
use vidq_core::store::JobStore;

pub async fn run_remove(store: &JobStore, id: JobId, delete_file: bool) -> Result<()> {
    let Some(job) = store.get_job(id).await? else {
        anyhow::bail!("job {id} not found");
    };
    if !job.status.is_terminal() {
        anyhow::bail!(
            "job {id} is {}; abort it before removing",
            job.status.label()
        );
    }
    if delete_file {
        if let Some(path) = &job.final_path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "deleted file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), "could not delete file: {}", e),
            }
        }
    }
    store.remove_job(id).await?;
    println!("Removed job {id}");
    Ok(())
}
