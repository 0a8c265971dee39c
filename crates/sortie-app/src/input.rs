//! JSON-lines input adapter.
//!
//! Each line on the reader is one `InputCommand`. Blank lines are skipped,
//! malformed lines are logged and dropped. End of input shuts the loop down.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use sortie_core::commands::InputCommand;

use crate::state::GameLoopCommand;

pub fn parse_line(line: &str) -> Result<Option<InputCommand>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Forward commands from `reader` until EOF or until the loop goes away.
pub async fn forward_commands<R>(reader: R, tx: mpsc::Sender<GameLoopCommand>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                Ok(Some(command)) => {
                    if tx.send(GameLoopCommand::Input(command)).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "dropping malformed input line"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "input read failed");
                break;
            }
        }
    }
    tracing::info!("input closed");
    let _ = tx.send(GameLoopCommand::Shutdown).await;
}
