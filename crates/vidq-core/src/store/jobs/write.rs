//! Job write operations: insert, save, abort, requeue, removal.

use anyhow::{bail, Result};

use crate::error::SchedulerError;
use crate::job::{Job, JobId, JobRequest};

use super::super::db::{unix_timestamp, JobStore};

/// Upsert of every record column. `requeued_at` is left alone.
const UPSERT_SQL: &str = r#"
    INSERT INTO jobs (
        id, source, source_locator, referer, quality_spec, audio_only,
        display_title, output_basename, basename_user_supplied, status,
        status_note, title_error, ready, created_at, completed_at,
        elapsed_seconds, failure_json, warnings_json, final_path, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
    ON CONFLICT(id) DO UPDATE SET
        source = excluded.source,
        source_locator = excluded.source_locator,
        referer = excluded.referer,
        quality_spec = excluded.quality_spec,
        audio_only = excluded.audio_only,
        display_title = excluded.display_title,
        output_basename = excluded.output_basename,
        basename_user_supplied = excluded.basename_user_supplied,
        status = excluded.status,
        status_note = excluded.status_note,
        title_error = excluded.title_error,
        ready = excluded.ready,
        created_at = excluded.created_at,
        completed_at = excluded.completed_at,
        elapsed_seconds = excluded.elapsed_seconds,
        failure_json = excluded.failure_json,
        warnings_json = excluded.warnings_json,
        final_path = excluded.final_path,
        updated_at = excluded.updated_at
"#;

/// Values are bound owned so the query does not borrow `job` for the executor's lifetime.
async fn upsert<'e, E>(executor: E, job: &Job) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let failure_json = job.failure.as_ref().map(serde_json::to_string).transpose()?;
    let warnings_json = if job.warnings.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&job.warnings)?)
    };
    let final_path = job
        .final_path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    sqlx::query(UPSERT_SQL)
        .bind(job.id)
        .bind(job.source.as_str())
        .bind(job.source_locator.clone())
        .bind(job.referer.clone())
        .bind(job.quality_spec.clone())
        .bind(job.audio_only)
        .bind(job.display_title.clone())
        .bind(job.output_basename.clone())
        .bind(job.output_basename_is_user_supplied)
        .bind(job.status.as_str())
        .bind(job.status_note.clone())
        .bind(job.title_error.clone())
        .bind(job.ready_for_scheduling)
        .bind(job.created_at)
        .bind(job.completed_at)
        .bind(job.elapsed_seconds as i64)
        .bind(failure_json)
        .bind(warnings_json)
        .bind(final_path)
        .bind(unix_timestamp())
        .execute(executor)
        .await?;
    Ok(())
}

impl JobStore {
    /// Creates a job for `request` and returns the stored record.
    /// Ids continue after the highest id ever stored.
    pub async fn insert_job(&self, request: JobRequest) -> Result<Job> {
        let now = unix_timestamp();
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO jobs (
                source, source_locator, quality_spec, display_title,
                output_basename, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, '', '', 'queued', ?4, ?4)
            "#,
        )
        .bind(request.source.as_str())
        .bind(&request.source_locator)
        .bind(&request.quality_spec)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let job = Job::new(id, request, now);
        upsert(&mut *tx, &job).await?;
        tx.commit().await?;
        tracing::debug!(job_id = id, source = job.source.as_str(), "job inserted");
        Ok(job)
    }

    /// Writes the whole record.
    pub async fn save_job(&self, job: &Job) -> Result<()> {
        upsert(&self.pool, job).await
    }

    /// Replaces every terminal record with `records`.
    pub async fn replace_history(&self, records: &[Job]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM jobs WHERE status IN ('completed', 'failed', 'aborted')")
            .execute(&mut *tx)
            .await?;
        for job in records {
            if !job.status.is_terminal() {
                bail!("job {} is not terminal ({})", job.id, job.status.as_str());
            }
            upsert(&mut *tx, job).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Marks a queued or title-pending job ABORTED. Returns false when the
    /// job is not waiting (unknown, running or finished).
    pub async fn abort_if_pending(&self, id: JobId) -> Result<bool> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'aborted',
                completed_at = ?1,
                status_note = NULL,
                updated_at = ?1
            WHERE id = ?2 AND status IN ('queued', 'title_pending')
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected() > 0)
    }

    /// Records that `id` was retried, so it sorts first in `list_queued`.
    pub async fn mark_requeued(&self, id: JobId) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query("UPDATE jobs SET requeued_at = ?1, updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Retry without a running scheduler: reset a FAILED or ABORTED job to QUEUED.
    pub async fn requeue(&self, id: JobId) -> Result<Job> {
        let Some(mut job) = self.get_job(id).await? else {
            return Err(SchedulerError::NotFound(id).into());
        };
        if !job.status.is_retryable() {
            return Err(SchedulerError::NotRetryable(id).into());
        }
        job.reset_for_retry();
        self.save_job(&job).await?;
        self.mark_requeued(id).await?;
        Ok(job)
    }

    /// Deletes a job record and returns it.
    pub async fn remove_job(&self, id: JobId) -> Result<Option<Job>> {
        let job = self.get_job(id).await?;
        if job.is_some() {
            sqlx::query("DELETE FROM jobs WHERE id = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        Ok(job)
    }

    /// Deletes every terminal record. Returns the number removed.
    pub async fn clear_history(&self) -> Result<u64> {
        let r = sqlx::query("DELETE FROM jobs WHERE status IN ('completed', 'failed', 'aborted')")
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    /// Resets jobs left ACTIVE by a crashed session to QUEUED.
    pub async fn recover_active_jobs(&self) -> Result<u64> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'queued',
                status_note = NULL,
                elapsed_seconds = 0,
                updated_at = ?1
            WHERE status = 'active'
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }
}
