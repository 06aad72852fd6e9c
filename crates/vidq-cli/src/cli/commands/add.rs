//! `vidq add <locator>` – queue a new job.

use anyhow::{Context, Result};
use std::path::Path;
use vidq_core::config::VidqConfig;
use vidq_core::job::{validate_request, JobRequest, Source};
use vidq_core::scheduler::Command;
use vidq_core::store::JobStore;

use crate::cli::control_socket;

#[derive(Debug, Clone)]
pub struct AddArgs {
    pub locator: String,
    pub source: Source,
    pub referer: Option<String>,
    pub quality: Option<String>,
    pub audio_only: bool,
    pub name: Option<String>,
}

/// Absolute, symlink-free form of a local locator; relative paths resolve against `base`.
pub fn resolve_local_locator(locator: &str, base: &Path) -> Result<String> {
    let path = base.join(locator.trim());
    let canonical = std::fs::canonicalize(&path)
        .with_context(|| format!("resolve local file {}", path.display()))?;
    Ok(canonical.to_string_lossy().into_owned())
}

/// Builds the request, filling the quality preset from config. Local paths
/// are stored absolute so `vidq run` finds them from any directory.
pub fn build_request(args: AddArgs, cfg: &VidqConfig) -> Result<JobRequest> {
    let quality = args.quality.unwrap_or_else(|| {
        if args.source.is_remote() {
            cfg.default_remote_quality.clone()
        } else {
            cfg.default_local_quality.clone()
        }
    });
    if args.audio_only && !args.source.is_remote() {
        anyhow::bail!("--audio-only applies to remote sources only");
    }
    let mut request = JobRequest {
        source: args.source,
        source_locator: args.locator.trim().to_string(),
        referer: args.referer,
        quality_spec: quality,
        audio_only: args.audio_only,
        output_name: args.name,
    };
    validate_request(&request).context("rejected job")?;
    if request.source == Source::LocalFile {
        let base = std::env::current_dir()?;
        request.source_locator = resolve_local_locator(&request.source_locator, &base)?;
    }
    Ok(request)
}

pub async fn run_add(store: &JobStore, cfg: &VidqConfig, args: AddArgs) -> Result<()> {
    let request = build_request(args, cfg)?;
    let job = store.insert_job(request).await?;
    println!(
        "Added job {} ({}) for {}",
        job.id,
        job.status.label(),
        job.source_locator
    );
    if control_socket::notify_runner(Command::Submit(job.id)).await {
        tracing::debug!(job_id = job.id, "handed job to running scheduler");
    }
    Ok(())
}
