//! `vidq abort <id>` – abort a job. If `vidq run` is active, it kills the running process.

use anyhow::Result;
use vidq_core::job::JobId;
use vidq_core::scheduler::Command;
use vidq_core::store::JobStore;

use crate::cli::control_socket;

pub async fn run_abort(store: &JobStore, id: JobId) -> Result<()> {
    if control_socket::notify_runner(Command::Abort(id)).await {
        println!("Abort requested for job {id}");
        return Ok(());
    }
    if store.abort_if_pending(id).await? {
        println!("Aborted job {id}");
    } else {
        match store.get_job(id).await? {
            Some(job) => println!("Job {id} is {}; nothing to abort", job.status.label()),
            None => anyhow::bail!("job {id} not found"),
        }
    }
    Ok(())
}
