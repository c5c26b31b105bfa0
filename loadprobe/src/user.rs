//! Simulated user loop

use crate::recorder::Recorder;
use crate::tasks::{ProbeTasks, TaskKind, TaskTable};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Run counters shared across all simulated users.
#[derive(Debug, Default)]
pub struct ProbeStats {
    pub authenticate_runs: AtomicU64,
    pub probe_runs: AtomicU64,
    pub task_failures: AtomicU64,
}

/// One simulated user: its own HTTP client with a cookie store, a
/// sequential task loop, and a think-time pause between actions.
pub struct SimulatedUser {
    id: usize,
    client: reqwest::Client,
    tasks: Arc<ProbeTasks>,
    table: TaskTable,
    think_time_ms: (u64, u64),
    recorder: Recorder,
    stats: Arc<ProbeStats>,
}

impl SimulatedUser {
    pub fn new(
        id: usize,
        tasks: Arc<ProbeTasks>,
        table: TaskTable,
        think_time_ms: (u64, u64),
        recorder: Recorder,
        stats: Arc<ProbeStats>,
    ) -> Result<Self> {
        // Session state (cookies) persists across this user's requests
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            id,
            client,
            tasks,
            table,
            think_time_ms,
            recorder,
            stats,
        })
    }

    /// Sequential task loop until the deadline.
    ///
    /// Transport-level task failures are counted and logged; the loop
    /// keeps going.
    pub async fn run(self, deadline: Instant) {
        let mut rng = StdRng::from_entropy();
        debug!(user = self.id, "Simulated user starting");

        while Instant::now() < deadline {
            let kind = self.table.pick(&mut rng);
            let result = match kind {
                TaskKind::Authenticate => {
                    self.stats.authenticate_runs.fetch_add(1, Ordering::Relaxed);
                    self.tasks.authenticate(&self.client).await
                }
                TaskKind::ProbeMetadata => {
                    self.stats.probe_runs.fetch_add(1, Ordering::Relaxed);
                    self.tasks
                        .probe_metadata(&self.client, &self.recorder)
                        .await
                        .map(|_| ())
                }
            };

            if let Err(e) = result {
                self.stats.task_failures.fetch_add(1, Ordering::Relaxed);
                warn!(user = self.id, task = ?kind, error = %e, "Task failed");
            }

            let (min_ms, max_ms) = self.think_time_ms;
            let think = Duration::from_millis(rng.gen_range(min_ms..=max_ms));
            sleep(think).await;
        }

        debug!(user = self.id, "Simulated user finished");
    }
}
