//! Title resolution: a metadata-only run of the fetch tool.
//!
//! The probe prints line-delimited JSON; the first object carrying a string
//! `title` wins. Every failure is non-fatal for the job: the scheduler falls
//! back to `VideoPlayback_<id>` and marks the job ready anyway.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use crate::error::ProbeError;
use crate::job::{Job, Source};

/// Extracts the title from the probe's stdout.
pub fn parse_title(stdout: &str) -> Result<String, ProbeError> {
    for line in stdout.lines() {
        let line = line.trim();
        if !line.starts_with('{') {
            continue;
        }
        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        if let Some(title) = value.get("title").and_then(|t| t.as_str()) {
            return Ok(title.to_string());
        }
    }
    Err(ProbeError::Malformed)
}

/// Fetch tool arguments for the probe.
pub fn probe_args(job: &Job) -> Vec<String> {
    let mut args = vec![
        "--print-json".to_string(),
        "--skip-download".to_string(),
        job.source_locator.clone(),
    ];
    if job.source == Source::AltRemote {
        if let Some(r) = &job.referer {
            args.push("--add-header".to_string());
            args.push(format!("referer: {}", r));
        }
    }
    args
}

/// Runs the probe for `job`, killing it after `timeout`.
pub async fn probe_title(
    fetch_tool: &Path,
    job: &Job,
    timeout: Duration,
) -> Result<String, ProbeError> {
    let mut cmd = tokio::process::Command::new(fetch_tool);
    cmd.args(probe_args(job))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            ProbeError::ToolNotFound(fetch_tool.to_path_buf())
        }
        _ => ProbeError::Io(e),
    })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(res) => res?,
        Err(_) => {
            tracing::warn!(job_id = job.id, secs = timeout.as_secs(), "title probe timed out");
            return Err(ProbeError::Timeout(timeout.as_secs()));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
        return Err(ProbeError::Exit {
            code: output.status.code(),
            stderr: last.trim().to_string(),
        });
    }
    parse_title(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobRequest;

    #[test]
    fn first_object_with_title_wins() {
        let out = "WARNING: something\n{\"id\": \"x\"}\n{\"title\": \"First\"}\n{\"title\": \"Second\"}\n";
        assert_eq!(parse_title(out).unwrap(), "First");
    }

    #[test]
    fn missing_or_broken_json_is_malformed() {
        assert!(matches!(parse_title(""), Err(ProbeError::Malformed)));
        assert!(matches!(parse_title("{not json"), Err(ProbeError::Malformed)));
        assert!(matches!(parse_title("{\"title\": 5}"), Err(ProbeError::Malformed)));
    }

    #[test]
    fn probe_args_include_referer_for_alt_only() {
        let mut req = JobRequest::remote(Source::AltRemote, "https://alt/e/1", "Auto");
        req.referer = Some("https://alt/".into());
        let alt = Job::new(1, req.clone(), 0);
        assert_eq!(
            probe_args(&alt),
            vec!["--print-json", "--skip-download", "https://alt/e/1", "--add-header", "referer: https://alt/"]
        );
        req.source = Source::PrimaryRemote;
        let primary = Job::new(2, req, 0);
        assert_eq!(probe_args(&primary).len(), 3);
    }

    #[tokio::test]
    async fn missing_tool_is_reported() {
        let job = Job::new(
            1,
            JobRequest::remote(Source::PrimaryRemote, "https://example.com/v", "Auto"),
            0,
        );
        let err = probe_title(
            Path::new("/nonexistent/vidq-test/yt-dlp"),
            &job,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProbeError::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_probe_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("yt-dlp");
        std::fs::write(&tool, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        let job = Job::new(
            4,
            JobRequest::remote(Source::PrimaryRemote, "https://example.com/v", "Auto"),
            0,
        );

        let started = std::time::Instant::now();
        let err = probe_title(&tool, &job, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(1)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
