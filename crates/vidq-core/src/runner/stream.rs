//! Line pumps over the child's stdout and stderr.
//!
//! Both pipes feed one channel, so the runner sees a single line stream.
//! Lines end at `\n` or `\r` (the convert tool redraws its status line with
//! bare carriage returns); bytes are decoded lossily.
//!
//! Order is kept within each pipe. Across the two pipes lines arrive in the
//! order the pumps read them, which can differ from the order the tool wrote
//! them when both pipes are busy at once. The parsers only need per-pipe
//! order: the fetch tool reports progress on stdout, the convert tool on stderr.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub(crate) type LineResult = io::Result<String>;

/// Reads one segment up to (not including) the next `\n` or `\r`.
/// Returns the number of bytes consumed; 0 means EOF.
async fn read_segment<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut total = 0;
    loop {
        let (done, used) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(total);
            }
            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(i) => {
                    buf.extend_from_slice(&available[..i]);
                    (true, i + 1)
                }
                None => {
                    buf.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        total += used;
        if done {
            return Ok(total);
        }
    }
}

/// Spawns a task forwarding every non-empty line of `reader` to `tx`.
/// A read error is forwarded once and ends the pump.
pub(crate) fn spawn_line_pump<R>(reader: R, tx: UnboundedSender<LineResult>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match read_segment(&mut reader, &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(Ok(line.to_string())).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    })
}
