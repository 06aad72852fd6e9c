//! Output naming: title sanitization, fallback names, and conflict-free
//! names in the shared output directory.

mod sanitize;
mod unique;

pub use sanitize::sanitize_title;
pub use unique::reserve_unique_path;

/// Name used when no title is available (`VideoPlayback_<id>`).
pub fn fallback_basename(id: crate::job::JobId) -> String {
    format!("VideoPlayback_{}", id)
}
