//! Shell scripts standing in for the fetch and convert tools.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// How the fake fetch tool behaves for a download.
#[derive(Debug, Clone, Copy)]
pub enum FetchBehaviour {
    /// Prints progress, merges and writes the artifact; exits 0.
    Succeed,
    /// Prints one progress line and then blocks.
    Hang,
    /// Prints one progress line, closes stdout and stderr, then blocks.
    DetachOutput,
    /// Blocks in metadata mode too; downloads like `Succeed`.
    SlowProbe,
    /// Prints an error and exits with the given code.
    Fail(i32),
    /// Exits 0 without writing anything.
    NoArtifact,
}

/// Title reported in metadata mode.
pub const FAKE_TITLE: &str = "Fake: Video?";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Writes a fake `yt-dlp` into `dir`.
pub fn fetch_tool(dir: &Path, behaviour: FetchBehaviour) -> PathBuf {
    let download = match behaviour {
        FetchBehaviour::Succeed | FetchBehaviour::SlowProbe => {
            r#"echo "[youtube] x: Downloading webpage"
echo "[download]  10.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
echo "[download] 100.0% of 1.00MiB at 1.00MiB/s ETA 00:00"
echo "[Merger] Merging formats into \"$out\""
printf 'media-bytes' > "$out"
exit 0
"#
        }
        FetchBehaviour::Hang => {
            r#"echo "[download]   1.0% of 1.00MiB at 10.00KiB/s ETA 01:40"
exec sleep 30
"#
        }
        FetchBehaviour::DetachOutput => {
            r#"echo "[download]   1.0% of 1.00MiB at 10.00KiB/s ETA 01:40"
exec >/dev/null 2>&1
exec sleep 30
"#
        }
        FetchBehaviour::Fail(_) => "echo \"ERROR: unsupported URL\" >&2\nexit $FAKE_CODE\n",
        FetchBehaviour::NoArtifact => "echo \"[download] 100.0% of 1.00MiB\"\nexit 0\n",
    };
    let code = match behaviour {
        FetchBehaviour::Fail(code) => code,
        _ => 0,
    };
    let probe_delay = match behaviour {
        FetchBehaviour::SlowProbe => "exec sleep 30\n",
        _ => "",
    };
    let body = format!(
        r#"FAKE_CODE={code}
out=""
home=""
prev=""
for a in "$@"; do
  if [ "$a" = "--print-json" ]; then
    {probe_delay}echo 'WARNING: metadata only'
    echo '{{"id": "x", "title": "{title}"}}'
    exit 0
  fi
  if [ "$prev" = "--output" ]; then out="$a"; fi
  if [ "$prev" = "--paths" ]; then
    case "$a" in home:*) home="${{a#home:}}" ;; esac
  fi
  prev="$a"
done
if [ -n "$home" ]; then out="$home/$out"; fi
{download}"#,
        code = code,
        probe_delay = probe_delay,
        title = FAKE_TITLE,
        download = download
    );
    write_script(dir, "yt-dlp", &body)
}

/// Writes a fake `ffmpeg` that reports progress with carriage returns and
/// writes its last argument.
pub fn convert_tool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "ffmpeg",
        r#"for a in "$@"; do out="$a"; done
printf 'ffmpeg version 6.0 fake\n' >&2
printf 'frame=   10 fps=0.0 q=28.0 size=0kB time=00:00:01.00 bitrate=N/A speed=2.0x\r' >&2
printf 'frame=   20 fps=0.0 q=28.0 size=1kB time=00:00:02.00 bitrate=N/A speed=2.0x\r' >&2
printf 'video:1kB audio:1kB subtitle:0kB other streams:0kB global headers:0kB\n' >&2
printf 'converted' > "$out"
exit 0
"#,
    )
}
