//! Job control for abort: shared abort signals and the control socket path.
//!
//! When the scheduler promotes a job it registers an `AbortSignal` here and
//! hands it to the runner. `request_abort` sets the flag (checked between
//! output lines) and wakes the runner even if it is blocked waiting for the
//! next line, so the process is killed without waiting for EOF.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::Notify;

use crate::job::JobId;

#[derive(Debug, Default)]
struct AbortState {
    requested: AtomicBool,
    notify: Notify,
}

/// Abort token for one running job. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    inner: Arc<AbortState>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Sets the flag and wakes the waiting runner. Idempotent.
    pub fn request(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }

    /// Resolves once abort has been requested.
    pub async fn requested(&self) {
        loop {
            if self.is_requested() {
                return;
            }
            self.inner.notify.notified().await;
        }
    }
}

/// Shared registry of job id -> abort signal.
#[derive(Default)]
pub struct JobControl {
    jobs: RwLock<HashMap<JobId, AbortSignal>>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running job; returns the signal to pass to the runner.
    pub fn register(&self, job_id: JobId) -> AbortSignal {
        let signal = AbortSignal::new();
        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job_id, signal.clone());
        signal
    }

    /// Unregister a job (call when the runner reports it finished).
    pub fn unregister(&self, job_id: JobId) {
        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&job_id);
    }

    /// Request abort for a job. Returns false when no such job is registered.
    pub fn request_abort(&self, job_id: JobId) -> bool {
        match self
            .jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&job_id)
        {
            Some(signal) => {
                signal.request();
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, job_id: JobId) -> bool {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&job_id)
    }
}

/// Default path for the control socket (same XDG state dir as the DB).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("vidq")?.get_state_home();
    Ok(dir.join("control.sock"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn register_and_abort() {
        let control = JobControl::new();
        let signal = control.register(3);
        assert!(control.is_registered(3));
        assert!(!signal.is_requested());
        assert!(control.request_abort(3));
        assert!(signal.is_requested());
        control.unregister(3);
        assert!(!control.is_registered(3));
        assert!(!control.request_abort(3));
    }

    #[tokio::test]
    async fn requested_wakes_waiter() {
        let signal = AbortSignal::new();
        let waiter = {
            let s = signal.clone();
            tokio::spawn(async move { s.requested().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.request();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .unwrap();
    }

    #[tokio::test]
    async fn requested_returns_immediately_when_already_set() {
        let signal = AbortSignal::new();
        signal.request();
        tokio::time::timeout(Duration::from_millis(100), signal.requested())
            .await
            .expect("already requested");
    }
}
