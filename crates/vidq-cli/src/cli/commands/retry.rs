//! `vidq retry <id>` – re-queue a failed or aborted job.

use anyhow::Result;
use vidq_core::job::JobId;
use vidq_core::scheduler::Command;
use vidq_core::store::JobStore;

use crate::cli::control_socket;

pub async fn run_retry(store: &JobStore, id: JobId) -> Result<()> {
    if control_socket::notify_runner(Command::Retry(id)).await {
        println!("Retry requested for job {id}");
        return Ok(());
    }
    let job = store.requeue(id).await?;
    println!("Re-queued job {} ({})", job.id, job.display_title);
    Ok(())
}
