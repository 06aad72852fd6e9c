//! Conflict-free names for the shared output directory.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Candidate file name for attempt `n` (0 = plain name).
fn candidate(base: &str, ext: &str, n: u32) -> String {
    if n == 0 {
        format!("{}{}", base, ext)
    } else {
        format!("{} ({}){}", base, n, ext)
    }
}

/// Atomically reserves `base + ext` in `dir`, or `base (1)ext`, `base (2)ext`, ...
///
/// The reservation is an empty file created with `create_new`, so two jobs
/// finishing at the same time can never pick the same name. The caller renames
/// the artifact over the placeholder (or removes it on failure).
pub fn reserve_unique_path(dir: &Path, base: &str, ext: &str) -> io::Result<PathBuf> {
    let mut n = 0u32;
    loop {
        let path = dir.join(candidate(base, ext, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_names() {
        assert_eq!(candidate("clip", ".mp4", 0), "clip.mp4");
        assert_eq!(candidate("clip", ".mp4", 2), "clip (2).mp4");
    }

    #[test]
    fn reserve_skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = reserve_unique_path(dir.path(), "a", ".mp3").unwrap();
        assert_eq!(first, dir.path().join("a.mp3"));
        let second = reserve_unique_path(dir.path(), "a", ".mp3").unwrap();
        assert_eq!(second, dir.path().join("a (1).mp3"));
        assert!(first.exists() && second.exists());
    }
}
