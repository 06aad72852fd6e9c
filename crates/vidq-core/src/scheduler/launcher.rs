//! The scheduler's seam to the outside world: starting job processes and title probes.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;

use crate::control::AbortSignal;
use crate::error::RunFailure;
use crate::job::{Job, JobId};
use crate::runner::{run_job, RunSettings};
use crate::storage;
use crate::title;

use super::event::{JobEvent, RunReport};

/// Starts work for the scheduler. Both calls return immediately; results come
/// back as `JobEvent`s on `events`.
pub trait Launcher: Send {
    /// Runs the job's external process. Must eventually send `JobEvent::Finished`.
    fn start_job(&self, job: Job, abort: AbortSignal, events: UnboundedSender<JobEvent>);

    /// Resolves the job's title. Must eventually send `JobEvent::TitleResolved`.
    fn probe_title(&self, job: &Job, events: UnboundedSender<JobEvent>);
}

/// Launcher that runs the real fetch and convert tools on tokio tasks.
pub struct ToolLauncher {
    settings: Arc<RunSettings>,
    probe_timeout: Duration,
}

impl ToolLauncher {
    pub fn new(settings: RunSettings, probe_timeout: Duration) -> Self {
        Self {
            settings: Arc::new(settings),
            probe_timeout,
        }
    }
}

/// Awaits `run` on its own task and always reports `Finished`, even when the
/// run panics. A panicked run is FAILED and its temp dir is removed here.
async fn supervise<F>(id: JobId, temp_dir: PathBuf, run: F, events: UnboundedSender<JobEvent>)
where
    F: Future<Output = RunReport> + Send + 'static,
{
    let started = Instant::now();
    let report = match tokio::spawn(run).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(job_id = id, error = %e, "job task died");
            match std::fs::remove_dir_all(&temp_dir) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => tracing::warn!(
                    job_id = id,
                    path = %temp_dir.display(),
                    error = %err,
                    "could not remove temp dir"
                ),
            }
            RunReport::failed(
                started.elapsed(),
                RunFailure::Io {
                    message: format!("job task died: {}", e),
                },
            )
        }
    };
    if events.send(JobEvent::Finished { id, report }).is_err() {
        tracing::warn!(job_id = id, "scheduler gone before job finished");
    }
}

impl Launcher for ToolLauncher {
    fn start_job(&self, job: Job, abort: AbortSignal, events: UnboundedSender<JobEvent>) {
        let settings = Arc::clone(&self.settings);
        let id = job.id;
        let temp_dir = storage::job_temp_dir(&settings.output_dir, id);
        let run = run_job(job, settings, abort, events.clone());
        tokio::spawn(supervise(id, temp_dir, run, events));
    }

    fn probe_title(&self, job: &Job, events: UnboundedSender<JobEvent>) {
        let fetch_tool = self.settings.tools.fetch.clone();
        let timeout = self.probe_timeout;
        let job = job.clone();
        tokio::spawn(async move {
            let outcome = title::probe_title(&fetch_tool, &job, timeout)
                .await
                .map_err(|e| e.to_string());
            let _ = events.send(JobEvent::TitleResolved { id: job.id, outcome });
        });
    }
}
