//! Simulated-user task behaviors
//!
//! Two tasks are registered. "authenticate" walks the login flow; no
//! response validation, the session cookie lands in the client's store.
//! "probe-metadata" scrapes the instance marker line from the about page;
//! a non-200 response or a body without the marker records nothing.

use crate::recorder::{Recorder, TrafficRecord};
use anyhow::{Context, Result};
use rand::Rng;
use regex::Regex;
use tracing::debug;

/// Marker scraped from about-page bodies: the sentence prefix plus
/// whatever trails on the same line.
const METADATA_MARKER: &str = r"This version of placemark is running on the following.*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Authenticate,
    ProbeMetadata,
}

/// Weighted task table. Both tasks stay registered; the weights set their
/// relative frequency per iteration.
#[derive(Debug, Clone, Copy)]
pub struct TaskTable {
    pub authenticate_weight: u32,
    pub probe_weight: u32,
}

impl TaskTable {
    pub fn new(authenticate_weight: u32, probe_weight: u32) -> Self {
        Self {
            authenticate_weight,
            probe_weight,
        }
    }

    /// Draw the next task. An all-zero table falls back to the probe task.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> TaskKind {
        let total = self.authenticate_weight + self.probe_weight;
        if total == 0 {
            return TaskKind::ProbeMetadata;
        }
        if rng.gen_range(0..total) < self.authenticate_weight {
            TaskKind::Authenticate
        } else {
            TaskKind::ProbeMetadata
        }
    }
}

/// Fixed credential payload for the authenticate task.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Task definitions bound to a target host.
pub struct ProbeTasks {
    host: String,
    credentials: Credentials,
    marker: Regex,
}

impl ProbeTasks {
    pub fn new(host: &str, credentials: Credentials) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            credentials,
            marker: Regex::new(METADATA_MARKER).unwrap(),
        }
    }

    /// GET /login, then POST /authenticate with the fixed form payload.
    pub async fn authenticate(&self, client: &reqwest::Client) -> Result<()> {
        client
            .get(format!("{}/login", self.host))
            .send()
            .await
            .context("GET /login failed")?;

        client
            .post(format!("{}/authenticate", self.host))
            .form(&[
                ("email", self.credentials.email.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .context("POST /authenticate failed")?;

        Ok(())
    }

    /// GET /about and scrape the metadata marker.
    ///
    /// Returns whether a record was appended.
    pub async fn probe_metadata(
        &self,
        client: &reqwest::Client,
        recorder: &Recorder,
    ) -> Result<bool> {
        let response = client
            .get(format!("{}/about", self.host))
            .send()
            .await
            .context("GET /about failed")?;

        if response.status() != reqwest::StatusCode::OK {
            debug!(status = %response.status(), "Skipping metadata scrape");
            return Ok(false);
        }

        let header = response
            .headers()
            .iter()
            .next()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .unwrap_or_default();

        let body = response
            .text()
            .await
            .context("Failed to read about page body")?;

        let matched = match self.marker.find(&body) {
            Some(m) => m.as_str().to_string(),
            None => return Ok(false),
        };

        recorder
            .record(TrafficRecord {
                header,
                metadata: matched,
            })
            .await?;
        Ok(true)
    }
}
