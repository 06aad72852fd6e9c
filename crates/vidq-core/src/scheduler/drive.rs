//! Control loop owning the scheduler.
//!
//! Ticks on a fixed interval (one promotion per tick), applies job events as
//! they arrive and serves control commands. Status transitions are persisted
//! through the job store; every visible change goes to the `StatusSink`.

use anyhow::Result;
use std::time::Duration;

use tokio::sync::mpsc::{Receiver, UnboundedReceiver};

use crate::error::{RunWarning, SchedulerError};
use crate::job::{Job, JobId};
use crate::store::JobStore;

use super::event::JobEvent;
use super::queue::{AbortOutcome, BatchSummary, Change, Scheduler, TickOutcome};

/// Control commands accepted while the loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Load a QUEUED job from the store and append it to the pending list.
    Submit(JobId),
    Abort(JobId),
    Retry(JobId),
    /// Abort running jobs, wait for them, and return. Pending jobs stay queued.
    Shutdown,
}

/// Renders scheduler output for the user.
pub trait StatusSink: Send {
    /// A job's status, caption or elapsed time changed.
    fn job_updated(&mut self, job: &Job);
    /// Non-blocking notice attached to a finished job.
    fn warning(&mut self, job: &Job, warning: &RunWarning);
    /// Running and pending became empty after activity.
    fn batch_complete(&mut self, summary: &BatchSummary);
}

#[derive(Debug, Clone, Copy)]
pub struct DriveOptions {
    pub tick: Duration,
    /// Keep running when idle (waiting for `Submit` commands).
    pub watch: bool,
}

async fn persist(store: &JobStore, job: Option<Job>) {
    if let Some(job) = job {
        if let Err(e) = store.save_job(&job).await {
            tracing::warn!(job_id = job.id, error = %e, "persisting job failed");
        }
    }
}

/// Runs the scheduler until it is idle (or, with `watch`, until `Shutdown`).
/// Returns the outcome counts of the whole session.
pub async fn drive(
    mut scheduler: Scheduler,
    mut events: UnboundedReceiver<JobEvent>,
    mut commands: Receiver<Command>,
    store: &JobStore,
    sink: &mut dyn StatusSink,
    options: DriveOptions,
) -> Result<BatchSummary> {
    let mut interval = tokio::time::interval(options.tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut session = BatchSummary::default();
    let mut commands_open = true;
    let mut shutting_down = false;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for id in scheduler.refresh_elapsed() {
                    if let Some(job) = scheduler.get(id) {
                        sink.job_updated(job);
                    }
                }
                if shutting_down {
                    if scheduler.running_count() == 0 {
                        break;
                    }
                    continue;
                }
                match scheduler.promote_tick() {
                    TickOutcome::Promoted(id) => {
                        persist(store, scheduler.get(id).cloned()).await;
                        if let Some(job) = scheduler.get(id) {
                            sink.job_updated(job);
                        }
                    }
                    TickOutcome::BatchComplete(summary) => {
                        session.completed += summary.completed;
                        session.failed += summary.failed;
                        session.aborted += summary.aborted;
                        sink.batch_complete(&summary);
                    }
                    TickOutcome::Idle => {}
                }
                if !options.watch && scheduler.is_idle() {
                    break;
                }
            }
            Some(event) = events.recv() => {
                match scheduler.apply(event) {
                    Some(Change::Title(id)) => {
                        persist(store, scheduler.get(id).cloned()).await;
                        if let Some(job) = scheduler.get(id) {
                            sink.job_updated(job);
                        }
                    }
                    Some(Change::Progress(id)) => {
                        if let Some(job) = scheduler.get(id) {
                            sink.job_updated(job);
                        }
                    }
                    Some(Change::Finished(id)) => {
                        persist(store, scheduler.get(id).cloned()).await;
                        if let Some(job) = scheduler.get(id) {
                            sink.job_updated(job);
                            for w in &job.warnings {
                                sink.warning(job, w);
                            }
                        }
                        if shutting_down && scheduler.running_count() == 0 {
                            break;
                        }
                    }
                    None => {}
                }
            }
            cmd = commands.recv(), if commands_open => {
                match cmd {
                    None => commands_open = false,
                    Some(Command::Shutdown) => {
                        tracing::info!(running = scheduler.running_count(), "shutdown requested");
                        shutting_down = true;
                        let running: Vec<JobId> = scheduler.running().map(|j| j.id).collect();
                        for id in running {
                            let _ = scheduler.abort(id);
                        }
                        if scheduler.running_count() == 0 {
                            break;
                        }
                    }
                    Some(cmd) => handle_command(&mut scheduler, store, sink, cmd).await,
                }
            }
        }
    }

    Ok(session)
}

async fn handle_command(
    scheduler: &mut Scheduler,
    store: &JobStore,
    sink: &mut dyn StatusSink,
    cmd: Command,
) {
    match cmd {
        Command::Submit(id) => match store.get_job(id).await {
            Ok(Some(job)) if !job.status.is_terminal() => match scheduler.submit(job) {
                Ok(()) => {
                    if let Some(job) = scheduler.get(id) {
                        sink.job_updated(job);
                    }
                }
                Err(e) => tracing::debug!(job_id = id, error = %e, "submit ignored"),
            },
            Ok(Some(job)) => {
                tracing::warn!(job_id = id, status = job.status.as_str(), "submit of finished job ignored")
            }
            Ok(None) => tracing::warn!(job_id = id, "submit of unknown job"),
            Err(e) => tracing::warn!(job_id = id, error = %e, "loading submitted job failed"),
        },
        Command::Abort(id) => match scheduler.abort(id) {
            Ok(AbortOutcome::Removed) => {
                persist(store, scheduler.get(id).cloned()).await;
                if let Some(job) = scheduler.get(id) {
                    sink.job_updated(job);
                }
            }
            Ok(AbortOutcome::Signalled) => {}
            Err(SchedulerError::NotFound(_)) => {
                if let Err(e) = store.abort_if_pending(id).await {
                    tracing::warn!(job_id = id, error = %e, "abort in store failed");
                }
            }
            Err(e) => tracing::warn!(job_id = id, error = %e, "abort rejected"),
        },
        Command::Retry(id) => {
            let res = match scheduler.retry(id) {
                Err(SchedulerError::NotFound(_)) => match store.get_job(id).await {
                    Ok(Some(job)) => scheduler.retry_record(job),
                    Ok(None) => Err(SchedulerError::NotFound(id)),
                    Err(e) => {
                        tracing::warn!(job_id = id, error = %e, "loading job for retry failed");
                        Err(SchedulerError::NotFound(id))
                    }
                },
                other => other,
            };
            match res {
                Ok(()) => {
                    persist(store, scheduler.get(id).cloned()).await;
                    if let Err(e) = store.mark_requeued(id).await {
                        tracing::warn!(job_id = id, error = %e, "recording retry failed");
                    }
                    if let Some(job) = scheduler.get(id) {
                        sink.job_updated(job);
                    }
                }
                Err(e) => tracing::warn!(job_id = id, error = %e, "retry rejected"),
            }
        }
        Command::Shutdown => {}
    }
}
