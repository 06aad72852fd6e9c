//! Logging for vidq sessions.
//!
//! Every `vidq` invocation appends to `~/.local/state/vidq/vidq.log`.
//! Scheduler and runner events carry `job_id`, `tool` and `status` fields so
//! one job's life can be grepped out of a long session. Raw tool output (when
//! `log_tool_output` is on) goes to the `vidq::tool_output` target and can be
//! silenced on its own with `RUST_LOG=info,vidq::tool_output=off`.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Tracing target used for the diagnostic copy of tool output lines.
pub const TOOL_OUTPUT_TARGET: &str = "vidq::tool_output";

/// Verbose for vidq's own crates, quiet for sqlx and friends.
const FILE_FILTER: &str = "info,vidq=debug,vidq_core=debug,sqlx=warn";

/// The terminal is for job status; only problems go to stderr.
const STDERR_FILTER: &str = "warn";

/// `RUST_LOG` when set and valid, `fallback` otherwise.
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// `~/.local/state/vidq/vidq.log`; the directory is created on first use.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidq")?;
    Ok(xdg_dirs.get_state_home().join("vidq.log"))
}

/// Installs the file subscriber. Errors when the state dir or the log file
/// cannot be opened; the caller then uses `init_logging_stderr`.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(FILE_FILTER))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {}", e))?;

    tracing::info!(pid = std::process::id(), "vidq session log opened at {}", path.display());
    Ok(())
}

/// Warnings and errors to stderr, no file.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(STDERR_FILTER))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
