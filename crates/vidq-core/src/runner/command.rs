//! Command lines for the external tools, one builder per job source.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ToolKind;
use crate::job::{Job, Source};

use super::quality::{LocalQuality, RemoteQuality};

/// Locations of the two external programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub fetch: PathBuf,
    pub convert: PathBuf,
}

impl ToolPaths {
    pub fn program(&self, tool: ToolKind) -> &Path {
        match tool {
            ToolKind::Fetch => &self.fetch,
            ToolKind::Convert => &self.convert,
        }
    }
}

/// A fully built command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: ToolKind,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    fn new(tool: ToolKind, tools: &ToolPaths) -> Self {
        Self {
            tool,
            program: tools.program(tool).to_path_buf(),
            args: Vec::new(),
        }
    }

    fn arg(&mut self, a: impl Into<OsString>) -> &mut Self {
        self.args.push(a.into());
        self
    }

    /// Arguments as lossy strings (logging and tests).
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Builds the command line for one kind of source.
pub trait InvocationBuilder: Send + Sync {
    fn build(&self, job: &Job, temp_dir: &Path, tools: &ToolPaths) -> ToolInvocation;
}

struct PrimaryRemoteBuilder;
struct AltRemoteBuilder;
struct LocalFileBuilder;

/// Escapes `%` so the fetch tool does not read the name as an output template field.
fn escape_template(base: &str) -> String {
    base.replace('%', "%%")
}

fn remote_invocation(
    job: &Job,
    temp_dir: &Path,
    tools: &ToolPaths,
    referer: Option<&str>,
    format: Option<String>,
) -> ToolInvocation {
    let mut inv = ToolInvocation::new(ToolKind::Fetch, tools);
    inv.arg(&job.source_locator);
    if let Some(r) = referer {
        inv.arg("--add-header").arg(format!("referer: {}", r));
    }
    // Only the file name is a template; the directory goes in through `--paths`.
    let output = format!(
        "{}{}",
        escape_template(&job.output_basename),
        job.expected_extension()
    );
    if job.audio_only {
        inv.arg("--extract-audio")
            .arg("--audio-format")
            .arg("mp3")
            .arg("--output")
            .arg(output);
    } else {
        inv.arg("--recode-video")
            .arg("mp4")
            .arg("--output")
            .arg(output);
    }
    if let Some(f) = format {
        inv.arg("-f").arg(f);
    }
    for kind in ["home:", "temp:"] {
        let mut paths = OsString::from(kind);
        paths.push(temp_dir.as_os_str());
        inv.arg("--paths").arg(paths);
    }
    inv.arg("--newline");
    inv
}

impl InvocationBuilder for PrimaryRemoteBuilder {
    fn build(&self, job: &Job, temp_dir: &Path, tools: &ToolPaths) -> ToolInvocation {
        let format = RemoteQuality::parse(&job.quality_spec).format_selector();
        remote_invocation(job, temp_dir, tools, None, format)
    }
}

impl InvocationBuilder for AltRemoteBuilder {
    fn build(&self, job: &Job, temp_dir: &Path, tools: &ToolPaths) -> ToolInvocation {
        remote_invocation(job, temp_dir, tools, job.referer.as_deref(), None)
    }
}

impl InvocationBuilder for LocalFileBuilder {
    fn build(&self, job: &Job, temp_dir: &Path, tools: &ToolPaths) -> ToolInvocation {
        let mut inv = ToolInvocation::new(ToolKind::Convert, tools);
        inv.arg("-i").arg(&job.source_locator);
        for a in LocalQuality::parse(&job.quality_spec).codec_args() {
            inv.arg(a);
        }
        inv.arg(temp_dir.join(job.artifact_file_name()));
        inv
    }
}

/// The builder for `source`.
pub fn builder_for(source: Source) -> &'static dyn InvocationBuilder {
    match source {
        Source::PrimaryRemote => &PrimaryRemoteBuilder,
        Source::AltRemote => &AltRemoteBuilder,
        Source::LocalFile => &LocalFileBuilder,
    }
}

/// Deterministic command line for `job` writing into `temp_dir`.
pub fn build_invocation(job: &Job, temp_dir: &Path, tools: &ToolPaths) -> ToolInvocation {
    builder_for(job.source).build(job, temp_dir, tools)
}
