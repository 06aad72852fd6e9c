//! One run of the external tool for one job.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use tokio::process::Child;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::control::AbortSignal;
use crate::error::{RunFailure, RunWarning};
use crate::job::Job;
use crate::logging::TOOL_OUTPUT_TARGET;
use crate::parser::LineParser;
use crate::scheduler::{JobEvent, RunReport};
use crate::storage;

use super::command::{build_invocation, ToolInvocation};
use super::guard::TempDirGuard;
use super::stream::spawn_line_pump;
use super::RunSettings;

/// How the output loop ended.
enum StreamEnd {
    Eof,
    Aborted,
    ReadError(io::Error),
}

fn spawn_failure(inv: &ToolInvocation, e: io::Error) -> RunFailure {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => RunFailure::ToolNotFound {
            tool: inv.tool.as_str().to_string(),
            program: inv.program.clone(),
        },
        _ => RunFailure::Io {
            message: format!("spawn {}: {}", inv.program.display(), e),
        },
    }
}

/// Runs `job` to a terminal outcome. Progress goes to `events` as it is
/// parsed; the caller reports the returned `RunReport`. The job's temp
/// directory is removed before this returns, whatever the outcome.
pub async fn run_job(
    job: Job,
    settings: Arc<RunSettings>,
    abort: AbortSignal,
    events: UnboundedSender<JobEvent>,
) -> RunReport {
    let started = Instant::now();
    let job_id = job.id;
    let temp_dir = storage::job_temp_dir(&settings.output_dir, job_id);
    let _guard = TempDirGuard {
        job_id,
        path: temp_dir.clone(),
    };

    if let Err(e) = tokio::fs::create_dir_all(&temp_dir).await {
        tracing::error!(job_id, path = %temp_dir.display(), error = %e, "cannot create temp dir");
        return RunReport::failed(
            started.elapsed(),
            RunFailure::Io {
                message: format!("create {}: {}", temp_dir.display(), e),
            },
        );
    }
    if abort.is_requested() {
        return RunReport::aborted(started.elapsed());
    }

    let inv = build_invocation(&job, &temp_dir, &settings.tools);
    tracing::info!(
        job_id,
        tool = inv.tool.as_str(),
        program = %inv.program.display(),
        args = ?inv.args_lossy(),
        "starting tool"
    );

    let mut cmd = inv.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            let failure = spawn_failure(&inv, e);
            tracing::error!(job_id, failure = %failure, "tool did not start");
            return RunReport::failed(started.elapsed(), failure);
        }
    };

    let mut end = stream_output(&mut child, &inv, &job, &settings, &abort, &events, started).await;

    // The tool may close its pipes and keep running; abort still applies until it exits.
    let waited = match end {
        StreamEnd::Eof => tokio::select! {
            biased;
            _ = abort.requested() => None,
            status = child.wait() => Some(status),
        },
        _ => None,
    };
    let exit = match waited {
        Some(status) => status,
        None => {
            if let Err(e) = child.start_kill() {
                tracing::debug!(job_id, error = %e, "kill failed (process already gone?)");
            }
            child.wait().await
        }
    };
    if abort.is_requested() {
        end = StreamEnd::Aborted;
    }
    let elapsed = started.elapsed();

    match end {
        StreamEnd::Aborted => {
            tracing::info!(job_id, "job aborted");
            RunReport::aborted(elapsed)
        }
        StreamEnd::ReadError(e) => {
            tracing::error!(job_id, error = %e, "reading tool output failed");
            RunReport::failed(
                elapsed,
                RunFailure::Io {
                    message: format!("read output: {}", e),
                },
            )
        }
        StreamEnd::Eof => match exit {
            Err(e) => RunReport::failed(
                elapsed,
                RunFailure::Io {
                    message: format!("wait: {}", e),
                },
            ),
            Ok(status) if status.success() => {
                let (final_path, warnings) = finalize(&job, &settings, temp_dir.clone()).await;
                tracing::info!(job_id, ?final_path, warnings = warnings.len(), "job completed");
                RunReport::completed(started.elapsed(), final_path, warnings)
            }
            Ok(status) => {
                tracing::warn!(job_id, code = ?status.code(), "tool exited with failure");
                RunReport::failed(elapsed, RunFailure::ExecutionFailed { code: status.code() })
            }
        },
    }
}

/// Feeds every output line to the parser until EOF, abort or a read error.
async fn stream_output(
    child: &mut Child,
    inv: &ToolInvocation,
    job: &Job,
    settings: &RunSettings,
    abort: &AbortSignal,
    events: &UnboundedSender<JobEvent>,
    started: Instant,
) -> StreamEnd {
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();
    if let Some(out) = child.stdout.take() {
        spawn_line_pump(out, line_tx.clone());
    }
    if let Some(err) = child.stderr.take() {
        spawn_line_pump(err, line_tx.clone());
    }
    drop(line_tx);

    let mut parser = LineParser::new(inv.tool);
    loop {
        tokio::select! {
            biased;
            _ = abort.requested() => return StreamEnd::Aborted,
            item = line_rx.recv() => match item {
                Some(Ok(line)) => {
                    if settings.log_tool_output {
                        tracing::debug!(target: TOOL_OUTPUT_TARGET, job_id = job.id, "{}", line);
                    }
                    if let Some(progress) = parser.feed(&line) {
                        let _ = events.send(JobEvent::Progress {
                            id: job.id,
                            progress,
                            elapsed: started.elapsed(),
                        });
                    }
                    if abort.is_requested() {
                        return StreamEnd::Aborted;
                    }
                }
                Some(Err(e)) => return StreamEnd::ReadError(e),
                None => return StreamEnd::Eof,
            },
        }
    }
}

/// Verifies the artifact and moves it into the output directory.
/// Problems become warnings; the job still completes.
async fn finalize(
    job: &Job,
    settings: &RunSettings,
    temp_dir: PathBuf,
) -> (Option<PathBuf>, Vec<RunWarning>) {
    let artifact = temp_dir.join(job.artifact_file_name());
    if !tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
        tracing::warn!(job_id = job.id, expected = %artifact.display(), "artifact missing");
        return (None, vec![RunWarning::ArtifactMissing { expected: artifact }]);
    }

    let output_dir = settings.output_dir.clone();
    let base = job.output_basename.clone();
    let ext = job.expected_extension();
    let policy = settings.on_conflict;
    let from = artifact.clone();
    let moved = tokio::task::spawn_blocking(move || {
        storage::finalize_artifact(&from, &output_dir, &base, ext, policy)
    })
    .await;

    match moved {
        Ok(Ok(dest)) => (Some(dest), Vec::new()),
        Ok(Err((to, e))) => {
            tracing::warn!(job_id = job.id, to = %to.display(), error = %e, "moving artifact failed");
            (
                None,
                vec![RunWarning::MoveFailed {
                    from: artifact,
                    to,
                    message: e.to_string(),
                }],
            )
        }
        Err(join_err) => (
            None,
            vec![RunWarning::MoveFailed {
                from: artifact,
                to: settings.output_dir.clone(),
                message: join_err.to_string(),
            }],
        ),
    }
}
