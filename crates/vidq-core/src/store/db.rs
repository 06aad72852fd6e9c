//! Connection, schema and timestamp helpers. Job CRUD lives in `jobs`.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the job database at `~/.local/state/vidq/jobs.db`.
#[derive(Clone)]
pub struct JobStore {
    pub(crate) pool: Pool<Sqlite>,
}

impl JobStore {
    /// Path of the default database file.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vidq")?;
        Ok(xdg_dirs.get_state_home().join("jobs.db"))
    }

    /// Open (or create) the default job database.
    pub async fn open_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(&path)
            .await
            .with_context(|| format!("open job database {}", path.display()))
    }

    /// Open (or create) the database at `path`. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        let store = JobStore { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        // AUTOINCREMENT: ids are never reused, even after the newest job is removed.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                source_locator TEXT NOT NULL,
                referer TEXT,
                quality_spec TEXT NOT NULL,
                audio_only INTEGER NOT NULL DEFAULT 0,
                display_title TEXT NOT NULL,
                output_basename TEXT NOT NULL,
                basename_user_supplied INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL,
                status_note TEXT,
                title_error TEXT,
                ready INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                completed_at INTEGER,
                elapsed_seconds INTEGER NOT NULL DEFAULT 0,
                failure_json TEXT,
                warnings_json TEXT,
                final_path TEXT,
                requeued_at INTEGER,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Current time as Unix seconds.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<JobStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = JobStore { pool };
    store.migrate().await?;
    Ok(store)
}
