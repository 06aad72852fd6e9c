//! Job runner: builds the tool command line, runs the process in the job's
//! own temp directory, streams its output through the parser and moves the
//! artifact into the output directory.

mod command;
mod guard;
mod quality;
mod run;
mod stream;

use std::path::{Path, PathBuf};

use crate::config::{ConflictPolicy, VidqConfig};

pub use command::{build_invocation, builder_for, InvocationBuilder, ToolInvocation, ToolPaths};
pub use quality::{LocalQuality, RemoteQuality};
pub use run::run_job;

/// Per-session settings shared by every run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_dir: PathBuf,
    pub tools: ToolPaths,
    pub on_conflict: ConflictPolicy,
    /// Copy raw tool lines to the log (target `vidq::tool_output`).
    pub log_tool_output: bool,
}

impl RunSettings {
    /// Settings from config, with a relative output dir resolved against `base`.
    pub fn from_config(cfg: &VidqConfig, base: &Path) -> Self {
        Self {
            output_dir: cfg.resolved_output_dir(base),
            tools: ToolPaths {
                fetch: cfg.fetch_tool.clone(),
                convert: cfg.convert_tool.clone(),
            },
            on_conflict: cfg.on_conflict,
            log_tool_output: cfg.log_tool_output,
        }
    }
}

#[cfg(test)]
mod tests;
