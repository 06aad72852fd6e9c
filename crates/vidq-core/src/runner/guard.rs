//! RAII guard that removes a job's temp directory when the run ends.

use std::io;
use std::path::PathBuf;

use crate::job::JobId;

pub(super) struct TempDirGuard {
    pub(super) job_id: JobId,
    pub(super) path: PathBuf,
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                job_id = self.job_id,
                path = %self.path.display(),
                error = %e,
                "could not remove temp dir"
            ),
        }
    }
}
