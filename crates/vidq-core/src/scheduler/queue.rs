//! The scheduler proper: pending list, running set, promotion, abort and retry.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;

use crate::control::JobControl;
use crate::error::SchedulerError;
use crate::job::{Job, JobId, JobStatus};
use crate::store::unix_timestamp;

use super::event::JobEvent;
use super::launcher::Launcher;

/// Terminal outcomes since the scheduler last went idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    pub aborted: usize,
}

impl BatchSummary {
    fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Completed => self.completed += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::Aborted => self.aborted += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.failed + self.aborted
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A ready job was moved to the running set and started.
    Promoted(JobId),
    /// Running and pending both became empty after activity. Reported once per batch.
    BatchComplete(BatchSummary),
    /// Nothing to do this tick.
    Idle,
}

/// Result of `abort`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortOutcome {
    /// The job was still pending; it is ABORTED now.
    Removed,
    /// The runner was told to kill the process; ABORTED arrives with `Finished`.
    Signalled,
}

/// Which job an applied event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Title(JobId),
    Progress(JobId),
    Finished(JobId),
}

struct RunningJob {
    job: Job,
    started: Instant,
}

/// Owned queue manager. All job state mutations go through `&mut self`.
pub struct Scheduler {
    max_concurrent: usize,
    pending: VecDeque<Job>,
    running: BTreeMap<JobId, RunningJob>,
    finished: BTreeMap<JobId, Job>,
    control: Arc<JobControl>,
    launcher: Box<dyn Launcher>,
    events_tx: UnboundedSender<JobEvent>,
    batch: BatchSummary,
    batch_active: bool,
}

impl Scheduler {
    pub fn new(
        max_concurrent: usize,
        control: Arc<JobControl>,
        launcher: Box<dyn Launcher>,
        events_tx: UnboundedSender<JobEvent>,
    ) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            pending: VecDeque::new(),
            running: BTreeMap::new(),
            finished: BTreeMap::new(),
            control,
            launcher,
            events_tx,
            batch: BatchSummary::default(),
            batch_active: false,
        }
    }

    fn contains(&self, id: JobId) -> bool {
        self.running.contains_key(&id)
            || self.finished.contains_key(&id)
            || self.pending.iter().any(|j| j.id == id)
    }

    /// Appends a job to the pending list; starts its title probe when it needs one.
    pub fn submit(&mut self, job: Job) -> Result<(), SchedulerError> {
        if self.contains(job.id) {
            return Err(SchedulerError::Duplicate(job.id));
        }
        if job.needs_title_probe() {
            tracing::debug!(job_id = job.id, "starting title probe");
            self.launcher.probe_title(&job, self.events_tx.clone());
        }
        tracing::info!(job_id = job.id, status = job.status.as_str(), "job submitted");
        self.pending.push_back(job);
        Ok(())
    }

    /// One scheduling step: promote at most one ready job, or report batch completion.
    pub fn promote_tick(&mut self) -> TickOutcome {
        if self.running.len() < self.max_concurrent {
            if let Some(pos) = self.pending.iter().position(|j| j.ready_for_scheduling) {
                if let Some(mut job) = self.pending.remove(pos) {
                    let id = job.id;
                    job.mark_active();
                    let abort = self.control.register(id);
                    self.launcher
                        .start_job(job.clone(), abort, self.events_tx.clone());
                    self.running.insert(
                        id,
                        RunningJob {
                            job,
                            started: Instant::now(),
                        },
                    );
                    self.batch_active = true;
                    tracing::info!(job_id = id, running = self.running.len(), "job promoted");
                    return TickOutcome::Promoted(id);
                }
            }
        }
        if self.batch_active && self.running.is_empty() && self.pending.is_empty() {
            self.batch_active = false;
            let summary = std::mem::take(&mut self.batch);
            tracing::info!(
                completed = summary.completed,
                failed = summary.failed,
                aborted = summary.aborted,
                "batch complete"
            );
            return TickOutcome::BatchComplete(summary);
        }
        TickOutcome::Idle
    }

    /// Aborts a pending job at once, or asks the runner of a running job to kill it.
    pub fn abort(&mut self, id: JobId) -> Result<AbortOutcome, SchedulerError> {
        if let Some(pos) = self.pending.iter().position(|j| j.id == id) {
            if let Some(mut job) = self.pending.remove(pos) {
                job.finish(JobStatus::Aborted, unix_timestamp(), 0, None, Vec::new(), None);
                if self.batch_active {
                    self.batch.record(JobStatus::Aborted);
                }
                tracing::info!(job_id = id, "pending job aborted");
                self.finished.insert(id, job);
                return Ok(AbortOutcome::Removed);
            }
        }
        if self.running.contains_key(&id) {
            self.control.request_abort(id);
            tracing::info!(job_id = id, "abort requested for running job");
            return Ok(AbortOutcome::Signalled);
        }
        Err(SchedulerError::NotFound(id))
    }

    /// Re-queues a FAILED or ABORTED job at the front of the pending list.
    pub fn retry(&mut self, id: JobId) -> Result<(), SchedulerError> {
        if self.running.contains_key(&id) || self.pending.iter().any(|j| j.id == id) {
            return Err(SchedulerError::NotRetryable(id));
        }
        let status = self
            .finished
            .get(&id)
            .map(|j| j.status)
            .ok_or(SchedulerError::NotFound(id))?;
        if !status.is_retryable() {
            return Err(SchedulerError::NotRetryable(id));
        }
        if let Some(job) = self.finished.remove(&id) {
            self.requeue_front(job);
        }
        Ok(())
    }

    /// Like `retry` for a terminal record this scheduler has not seen (e.g. loaded from history).
    pub fn retry_record(&mut self, job: Job) -> Result<(), SchedulerError> {
        if self.running.contains_key(&job.id) || self.pending.iter().any(|j| j.id == job.id) {
            return Err(SchedulerError::Duplicate(job.id));
        }
        if !job.status.is_retryable() {
            return Err(SchedulerError::NotRetryable(job.id));
        }
        self.finished.remove(&job.id);
        self.requeue_front(job);
        Ok(())
    }

    fn requeue_front(&mut self, mut job: Job) {
        job.reset_for_retry();
        tracing::info!(job_id = job.id, "job re-queued at front");
        self.pending.push_front(job);
    }

    /// Applies one job event. Events for unknown jobs are dropped.
    pub fn apply(&mut self, event: JobEvent) -> Option<Change> {
        match event {
            JobEvent::TitleResolved { id, outcome } => {
                let job = self.pending.iter_mut().find(|j| j.id == id)?;
                match outcome {
                    Ok(title) => {
                        tracing::info!(job_id = id, title = %title, "title resolved");
                        job.apply_title(&title);
                    }
                    Err(e) => {
                        tracing::warn!(job_id = id, error = %e, "title probe failed; using fallback name");
                        job.apply_title_failure(&e);
                    }
                }
                Some(Change::Title(id))
            }
            JobEvent::Progress {
                id,
                progress,
                elapsed,
            } => {
                let running = self.running.get_mut(&id)?;
                running.job.status_note = Some(progress.caption());
                running.job.progress = Some(progress);
                running.job.elapsed_seconds = elapsed.as_secs();
                Some(Change::Progress(id))
            }
            JobEvent::Finished { id, report } => {
                let RunningJob { mut job, .. } = self.running.remove(&id)?;
                self.control.unregister(id);
                tracing::info!(
                    job_id = id,
                    status = report.status.as_str(),
                    elapsed_secs = report.elapsed.as_secs(),
                    "job finished"
                );
                self.batch.record(report.status);
                job.finish(
                    report.status,
                    unix_timestamp(),
                    report.elapsed.as_secs(),
                    report.failure,
                    report.warnings,
                    report.final_path,
                );
                self.finished.insert(id, job);
                Some(Change::Finished(id))
            }
        }
    }

    /// Refreshes the elapsed time of running jobs; returns their ids.
    pub fn refresh_elapsed(&mut self) -> Vec<JobId> {
        self.running
            .values_mut()
            .map(|r| {
                r.job.elapsed_seconds = r.started.elapsed().as_secs();
                r.job.id
            })
            .collect()
    }

    /// Looks a job up in any of the three sets.
    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.running
            .get(&id)
            .map(|r| &r.job)
            .or_else(|| self.pending.iter().find(|j| j.id == id))
            .or_else(|| self.finished.get(&id))
    }

    pub fn pending(&self) -> impl Iterator<Item = &Job> {
        self.pending.iter()
    }

    pub fn running(&self) -> impl Iterator<Item = &Job> {
        self.running.values().map(|r| &r.job)
    }

    pub fn finished(&self) -> impl Iterator<Item = &Job> {
        self.finished.values()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// No running and no pending jobs.
    pub fn is_idle(&self) -> bool {
        self.running.is_empty() && self.pending.is_empty()
    }
}
