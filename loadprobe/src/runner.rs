//! Probe run orchestration

use crate::config::Config;
use crate::recorder::Recorder;
use crate::tasks::{Credentials, ProbeTasks, TaskTable};
use crate::user::{ProbeStats, SimulatedUser};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

/// Totals for one probe run.
#[derive(Debug)]
pub struct RunSummary {
    pub authenticate_runs: u64,
    pub probe_runs: u64,
    pub task_failures: u64,
    pub records_written: u64,
    pub output: PathBuf,
}

/// Spawn the recorder and the simulated users, run until the deadline,
/// then drain the recorder and report totals.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let output = config.output_path();
    let (recorder, writer) = Recorder::spawn(&output).await?;

    let tasks = Arc::new(ProbeTasks::new(
        &config.host,
        Credentials {
            email: config.email.clone(),
            password: config.password.clone(),
        },
    ));
    let table = TaskTable::new(config.authenticate_weight, config.probe_weight);
    let stats = Arc::new(ProbeStats::default());
    let deadline = Instant::now() + Duration::from_secs(config.duration_secs);

    info!(
        host = %config.host,
        users = config.users,
        duration_secs = config.duration_secs,
        output = %output.display(),
        "Starting load probe run"
    );

    let mut handles = Vec::with_capacity(config.users);
    for id in 0..config.users {
        let user = SimulatedUser::new(
            id,
            tasks.clone(),
            table,
            config.think_time_ms(),
            recorder.clone(),
            stats.clone(),
        )?;
        handles.push(tokio::spawn(user.run(deadline)));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "Simulated user task panicked");
        }
    }

    // Writer exits once every recorder clone is gone
    drop(recorder);
    let records_written = writer.await.context("Recorder writer task failed")?;

    let summary = RunSummary {
        authenticate_runs: stats.authenticate_runs.load(Ordering::Relaxed),
        probe_runs: stats.probe_runs.load(Ordering::Relaxed),
        task_failures: stats.task_failures.load(Ordering::Relaxed),
        records_written,
        output,
    };

    info!(
        authenticate_runs = summary.authenticate_runs,
        probe_runs = summary.probe_runs,
        task_failures = summary.task_failures,
        records_written = summary.records_written,
        output = %summary.output.display(),
        "Load probe run complete"
    );

    Ok(summary)
}
