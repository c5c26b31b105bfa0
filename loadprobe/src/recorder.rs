//! Traffic record sink
//!
//! All simulated users share one output file. Appends go through a single
//! writer task fed over a channel, so interleaved records from concurrent
//! users never shear. The file grows for the life of the run and is never
//! read back.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

pub const RECORD_DELIMITER: &str = "----------------------------------------";

/// One scraped record: the first response header and the matched metadata
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficRecord {
    pub header: (String, String),
    pub metadata: String,
}

impl TrafficRecord {
    fn render(&self) -> String {
        format!(
            "{}\nRequest Header: ({}, {})\nMetadata: {}\n",
            RECORD_DELIMITER, self.header.0, self.header.1, self.metadata
        )
    }
}

/// Cloneable handle for submitting records to the writer task.
#[derive(Clone)]
pub struct Recorder {
    tx: mpsc::Sender<TrafficRecord>,
}

impl Recorder {
    /// Spawn the writer task appending to `path`.
    ///
    /// The task drains the channel, flushes, and returns the record count
    /// once every `Recorder` clone has been dropped.
    pub async fn spawn(path: &Path) -> Result<(Self, JoinHandle<u64>)> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to open output file {}", path.display()))?;

        let (tx, mut rx) = mpsc::channel::<TrafficRecord>(256);
        let path = path.to_path_buf();

        let task = tokio::spawn(async move {
            let mut written = 0u64;
            while let Some(record) = rx.recv().await {
                if let Err(e) = file.write_all(record.render().as_bytes()).await {
                    error!(path = %path.display(), error = %e, "Failed to append traffic record");
                    continue;
                }
                written += 1;
            }
            if let Err(e) = file.flush().await {
                error!(path = %path.display(), error = %e, "Failed to flush output file");
            }
            debug!(records = written, path = %path.display(), "Recorder drained");
            written
        });

        Ok((Self { tx }, task))
    }

    /// Submit one record. Fails only if the writer task is gone.
    pub async fn record(&self, record: TrafficRecord) -> Result<()> {
        self.tx
            .send(record)
            .await
            .context("Recorder writer task has shut down")
    }
}
