//! Job read operations.

use anyhow::Result;

use crate::job::{Job, JobId};

use super::super::db::JobStore;
use super::super::row::{job_from_row, JOB_COLUMNS};

impl JobStore {
    /// One job by id.
    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let sql = format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(job_from_row).transpose()
    }

    /// Every job, oldest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let sql = format!("SELECT {} FROM jobs ORDER BY id ASC", JOB_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(job_from_row).collect()
    }

    /// Non-terminal jobs (queued, title pending, active), oldest first.
    pub async fn list_unfinished(&self) -> Result<Vec<Job>> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE status IN ('queued', 'title_pending', 'active') ORDER BY id ASC",
            JOB_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(job_from_row).collect()
    }

    /// Jobs waiting to run, in submission order: retried jobs first (most
    /// recently retried first), then by id.
    pub async fn list_queued(&self) -> Result<Vec<Job>> {
        let sql = format!(
            r#"
            SELECT {} FROM jobs
            WHERE status IN ('queued', 'title_pending')
            ORDER BY requeued_at IS NULL, requeued_at DESC, id ASC
            "#,
            JOB_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(job_from_row).collect()
    }

    /// All terminal records, newest completion first.
    pub async fn load_history(&self) -> Result<Vec<Job>> {
        let sql = format!(
            r#"
            SELECT {} FROM jobs
            WHERE status IN ('completed', 'failed', 'aborted')
            ORDER BY completed_at DESC, id DESC
            "#,
            JOB_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(job_from_row).collect()
    }
}
