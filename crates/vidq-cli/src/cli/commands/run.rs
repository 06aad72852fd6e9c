//! `vidq run` – drive the scheduler over the queued jobs.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use vidq_core::config::VidqConfig;
use vidq_core::control::JobControl;
use vidq_core::error::RunWarning;
use vidq_core::job::{Job, JobId, JobStatus};
use vidq_core::runner::RunSettings;
use vidq_core::scheduler::{
    self, BatchSummary, Command, DriveOptions, Scheduler, StatusSink, ToolLauncher,
};
use vidq_core::storage;
use vidq_core::store::JobStore;

use super::status::status_row;
use crate::cli::control_socket;

/// Prints status changes to stdout. Elapsed-only updates are not printed.
#[derive(Default)]
struct ConsoleSink {
    last_seen: HashMap<JobId, String>,
}

impl StatusSink for ConsoleSink {
    fn job_updated(&mut self, job: &Job) {
        let key = format!("{}|{}", job.status.as_str(), job.status_note.as_deref().unwrap_or(""));
        if self.last_seen.get(&job.id) == Some(&key) {
            return;
        }
        let line = status_row(job);
        match job.status {
            JobStatus::Completed => match &job.final_path {
                Some(p) => println!("{}  -> {}", line, p.display()),
                None => println!("{}", line),
            },
            JobStatus::Failed => match &job.failure {
                Some(f) => println!("{}  ({})", line, f),
                None => println!("{}", line),
            },
            _ => println!("{}", line),
        }
        if job.status.is_terminal() {
            self.last_seen.remove(&job.id);
        } else {
            self.last_seen.insert(job.id, key);
        }
    }

    fn warning(&mut self, job: &Job, warning: &RunWarning) {
        println!("warning: job {} ({}): {}", job.id, job.display_title, warning);
    }

    fn batch_complete(&mut self, summary: &BatchSummary) {
        println!(
            "Queue finished: {} completed, {} failed, {} aborted",
            summary.completed, summary.failed, summary.aborted
        );
    }
}

pub async fn run_scheduler(
    store: &JobStore,
    cfg: &VidqConfig,
    jobs: Option<usize>,
    watch: bool,
) -> Result<()> {
    let base = std::env::current_dir()?;
    let settings = RunSettings::from_config(cfg, &base);

    let removed = storage::cleanup_stale_temp_dirs(&settings.output_dir)?;
    if removed > 0 {
        tracing::info!("removed {} stale temp dir(s)", removed);
    }
    let recovered = store.recover_active_jobs().await?;
    if recovered > 0 {
        tracing::info!("recovered {} job(s) from previous run", recovered);
    }

    let max_concurrent = jobs.unwrap_or(cfg.max_concurrent);
    if max_concurrent == 0 {
        anyhow::bail!("--jobs must be at least 1");
    }

    let control = Arc::new(JobControl::new());
    let launcher = ToolLauncher::new(settings, cfg.title_probe_timeout());
    let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut sched = Scheduler::new(max_concurrent, control, Box::new(launcher), events_tx);

    let queued = store.list_queued().await?;
    if queued.is_empty() && !watch {
        println!("No queued jobs.");
        return Ok(());
    }
    for job in queued {
        let id = job.id;
        if let Err(e) = sched.submit(job) {
            tracing::warn!(job_id = id, error = %e, "could not submit queued job");
        }
    }

    let (cmd_tx, cmd_rx) = tokio::sync::mpsc::channel::<Command>(32);
    let mut socket = None;
    if let Ok(socket_path) = vidq_core::control::default_control_socket_path() {
        match control_socket::spawn_control_listener(cmd_tx.clone(), &socket_path) {
            Ok((handle, guard)) => {
                tracing::debug!(path = %socket_path.display(), "control socket listening");
                socket = Some((handle, guard));
            }
            Err(e) => tracing::warn!(path = %socket_path.display(), "control socket bind: {:#}", e),
        }
    }

    let ctrl_c_tx = cmd_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Stopping: aborting running jobs...");
            let _ = ctrl_c_tx.send(Command::Shutdown).await;
        }
    });
    drop(cmd_tx);

    let mut sink = ConsoleSink::default();
    let options = DriveOptions {
        tick: cfg.tick_interval(),
        watch,
    };
    let session = scheduler::drive(sched, events_rx, cmd_rx, store, &mut sink, options).await?;

    if let Some((handle, _guard)) = socket.take() {
        handle.abort();
    }
    tracing::info!(
        completed = session.completed,
        failed = session.failed,
        aborted = session.aborted,
        "run finished"
    );
    Ok(())
}
