//! The speech seam between the voice agent and a real-time audio stack.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::BufRead;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// Text-to-speech and speech-to-text as the voice agent sees them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechPipeline: Send + Sync {
    /// Speaks `text` and resolves once playout has finished.
    async fn say(&self, text: &str) -> Result<()>;

    /// Waits for the participant's next final transcript.
    ///
    /// Returns `None` if nothing was said within `timeout`.
    async fn listen(&self, timeout: Duration) -> Result<Option<String>>;
}

/// A terminal stand-in for the audio stack: "speaking" prints a line and
/// "listening" reads one from stdin.
pub struct ConsolePipeline {
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl ConsolePipeline {
    /// Starts the stdin reader thread.
    ///
    /// Reading happens on a plain thread so a pending read never holds up runtime
    /// shutdown.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            debug!("stdin closed");
        });
        Self {
            lines: Mutex::new(rx),
        }
    }
}

#[async_trait]
impl SpeechPipeline for ConsolePipeline {
    async fn say(&self, text: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("agent> {text}\n").as_bytes())
            .await
            .context("Failed to write to stdout")?;
        stdout.flush().await.context("Failed to flush stdout")?;
        Ok(())
    }

    async fn listen(&self, timeout: Duration) -> Result<Option<String>> {
        let mut lines = self.lines.lock().await;
        let heard = match tokio::time::timeout(timeout, lines.recv()).await {
            Ok(Some(line)) => Some(line.trim().to_string()).filter(|l| !l.is_empty()),
            // Closed stdin reads as silence, same as running out of time.
            Ok(None) | Err(_) => None,
        };
        Ok(heard)
    }
}
