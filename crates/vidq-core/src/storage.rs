//! Disk layout and file lifecycle.
//!
//! Every job writes into its own `<output_dir>/temp/<id>` directory; finished
//! artifacts are moved into `<output_dir>` (rename, or copy + remove when the
//! rename crosses filesystems). Leftover temp directories from a previous
//! session are removed before the scheduler starts.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ConflictPolicy;
use crate::job::JobId;
use crate::naming;

/// Name of the shared temp directory under the output directory.
pub const TEMP_SUBDIR: &str = "temp";

/// `<output_dir>/temp`.
pub fn temp_root(output_dir: &Path) -> PathBuf {
    output_dir.join(TEMP_SUBDIR)
}

/// `<output_dir>/temp/<id>`; exclusive to one job.
pub fn job_temp_dir(output_dir: &Path, id: JobId) -> PathBuf {
    temp_root(output_dir).join(id.to_string())
}

/// Removes every entry under `<output_dir>/temp`. Returns how many were removed.
pub fn cleanup_stale_temp_dirs(output_dir: &Path) -> Result<usize> {
    let root = temp_root(output_dir);
    let entries = match fs::read_dir(&root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(e).with_context(|| format!("read temp dir {}", root.display()));
        }
    };
    let mut removed = 0;
    for entry in entries {
        let path = entry?.path();
        let res = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match res {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed stale temp entry");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not remove stale temp entry");
            }
        }
    }
    Ok(removed)
}

/// Picks the final destination for `<base><ext>` in `output_dir`.
///
/// With `Rename` the returned path is already reserved on disk (an empty
/// placeholder the artifact replaces).
pub fn final_destination(
    output_dir: &Path,
    base: &str,
    ext: &str,
    policy: ConflictPolicy,
) -> io::Result<PathBuf> {
    match policy {
        ConflictPolicy::Rename => naming::reserve_unique_path(output_dir, base, ext),
        ConflictPolicy::Overwrite => Ok(output_dir.join(format!("{}{}", base, ext))),
    }
}

/// Moves `from` to `to`: rename first, copy + remove when the rename fails
/// (typically EXDEV across filesystems).
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                error = %rename_err,
                "rename failed, falling back to copy"
            );
            fs::copy(from, to)?;
            fs::remove_file(from)?;
            Ok(())
        }
    }
}

/// Moves a finished artifact into the output directory under the conflict policy.
/// On failure any reserved placeholder is removed again.
pub fn finalize_artifact(
    artifact: &Path,
    output_dir: &Path,
    base: &str,
    ext: &str,
    policy: ConflictPolicy,
) -> Result<PathBuf, (PathBuf, io::Error)> {
    let planned = output_dir.join(format!("{}{}", base, ext));
    fs::create_dir_all(output_dir).map_err(|e| (planned.clone(), e))?;
    let dest = final_destination(output_dir, base, ext, policy).map_err(|e| (planned, e))?;
    if let Err(e) = move_file(artifact, &dest) {
        if policy == ConflictPolicy::Rename {
            let _ = fs::remove_file(&dest);
        }
        return Err((dest, e));
    }
    Ok(dest)
}
