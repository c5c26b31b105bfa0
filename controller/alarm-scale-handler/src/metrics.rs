//! Metrics recorder for the alarm scale handler
//!
//! Log-based: counters are emitted as structured tracing events and
//! aggregated downstream by the log pipeline.

use tracing::info;

/// Metrics recorder for the alarm scale handler
#[derive(Clone)]
pub struct Metrics;

impl Metrics {
    /// Record the response produced for one notification
    pub fn record_response(&self, status_code: u16, group: &str) {
        info!(
            status_code = status_code,
            group = %group,
            "Recorded notification response"
        );
    }

    /// Record a processing error
    pub fn record_error(&self, error_type: &str, group: &str) {
        info!(
            error_type = %error_type,
            group = %group,
            "Recorded error"
        );
    }
}
