//! Control socket: server (during `vidq run`) and client (for `add`, `abort`, `retry`).
//! Protocol: one line per command: "submit <id>", "abort <id>" or "retry <id>".

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc::Sender;
use vidq_core::scheduler::Command;

/// Parses one protocol line. `None` for malformed lines.
pub fn parse_line(line: &str) -> Option<Command> {
    let (verb, arg) = line.trim().split_once(' ')?;
    let id = arg.trim().parse::<i64>().ok()?;
    match verb {
        "submit" => Some(Command::Submit(id)),
        "abort" => Some(Command::Abort(id)),
        "retry" => Some(Command::Retry(id)),
        _ => None,
    }
}

/// Protocol line for `cmd`; `None` for commands not sent over the socket.
pub fn format_line(cmd: Command) -> Option<String> {
    match cmd {
        Command::Submit(id) => Some(format!("submit {}\n", id)),
        Command::Abort(id) => Some(format!("abort {}\n", id)),
        Command::Retry(id) => Some(format!("retry {}\n", id)),
        Command::Shutdown => None,
    }
}

/// Removes the socket file when the run ends.
pub struct SocketGuard(PathBuf);

impl Drop for SocketGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// Binds `path` and spawns a task forwarding every valid line to `commands`.
/// Malformed lines are logged and ignored.
pub fn spawn_control_listener(
    commands: Sender<Command>,
    path: impl AsRef<Path>,
) -> Result<(tokio::task::JoinHandle<()>, SocketGuard)> {
    let path = path.as_ref().to_path_buf();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let commands = commands.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            match parse_line(&line) {
                                Some(cmd) => {
                                    if commands.send(cmd).await.is_err() {
                                        return;
                                    }
                                }
                                None => tracing::debug!(line = %line, "ignored control line"),
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok((handle, SocketGuard(path)))
}

/// Sends `cmd` to a running `vidq run`. Returns false when no runner is listening.
pub async fn send(socket_path: &Path, cmd: Command) -> Result<bool> {
    let Some(line) = format_line(cmd) else {
        return Ok(false);
    };
    if !socket_path.exists() {
        return Ok(false);
    }
    let mut stream = match UnixStream::connect(socket_path).await {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(path = %socket_path.display(), "control socket connect: {}", e);
            return Ok(false);
        }
    };
    stream.write_all(line.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(true)
}

/// `send` against the default socket path; any error counts as "no runner".
pub async fn notify_runner(cmd: Command) -> bool {
    match vidq_core::control::default_control_socket_path() {
        Ok(path) => send(&path, cmd).await.unwrap_or_else(|e| {
            tracing::debug!("control socket send: {:#}", e);
            false
        }),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_verbs() {
        assert_eq!(parse_line("submit 4"), Some(Command::Submit(4)));
        assert_eq!(parse_line("  abort 12 \n"), Some(Command::Abort(12)));
        assert_eq!(parse_line("retry 7"), Some(Command::Retry(7)));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line("pause 4"), None);
        assert_eq!(parse_line("abort"), None);
        assert_eq!(parse_line("abort x"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn format_matches_parse() {
        let line = format_line(Command::Retry(9)).unwrap();
        assert_eq!(parse_line(&line), Some(Command::Retry(9)));
        assert_eq!(format_line(Command::Shutdown), None);
    }

    #[tokio::test]
    async fn listener_forwards_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control.sock");
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        let (handle, guard) = spawn_control_listener(tx, &path).unwrap();

        assert!(send(&path, Command::Abort(3)).await.unwrap());
        let got = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(got, Some(Command::Abort(3)));

        handle.abort();
        drop(guard);
        assert!(!path.exists());
        assert!(!send(&path, Command::Abort(3)).await.unwrap());
    }
}
