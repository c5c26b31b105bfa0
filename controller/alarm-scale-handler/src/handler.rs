//! Alarm-driven max-size adjuster
//!
//! One notification in, one response out. An active alarm bumps the
//! group's MaxSize by exactly one, capped at the ceiling; repeated active
//! notifications converge on the ceiling.

use crate::autoscaling::AutoscalingApi;
use crate::event::{AlarmState, SnsEnvelope};
use anyhow::{bail, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// What one notification did to the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOutcome {
    /// Alarm not active; nothing read or written.
    NoAction,
    /// Alarm active but the group already sits at the ceiling.
    AlreadyAtCeiling { max_size: u32 },
    /// Max size bumped by one.
    Increased { new_max: u32 },
}

impl ScaleOutcome {
    fn message(&self, ceiling: u32) -> String {
        match self {
            ScaleOutcome::NoAction => "No action taken. Alarm state: OK".to_string(),
            ScaleOutcome::AlreadyAtCeiling { .. } => {
                format!("Max instances already at maximum limit of {}", ceiling)
            }
            ScaleOutcome::Increased { new_max } => {
                format!("Max instances increased to {}", new_max)
            }
        }
    }
}

/// Response returned to the delivery system for every notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    fn error(body: String) -> Self {
        Self {
            status_code: 500,
            body,
        }
    }
}

/// Stateless per-notification adjuster over an autoscaling API.
pub struct ScaleAdjuster<A: AutoscalingApi> {
    api: Arc<A>,
    group_name: String,
    max_size_ceiling: u32,
}

impl<A: AutoscalingApi> ScaleAdjuster<A> {
    pub fn new(api: Arc<A>, group_name: impl Into<String>, max_size_ceiling: u32) -> Self {
        Self {
            api,
            group_name: group_name.into(),
            max_size_ceiling,
        }
    }

    /// Process one notification payload.
    ///
    /// Never fails: every error - malformed event, missing configuration,
    /// service-call failure - collapses into a 500 response carrying the
    /// error's description. Either the full read-then-maybe-update
    /// sequence completes or nothing is mutated.
    pub async fn handle(&self, payload: &[u8]) -> HandlerResponse {
        match self.apply(payload).await {
            Ok(outcome) => {
                let response = HandlerResponse::ok(outcome.message(self.max_size_ceiling));
                info!(
                    group = %self.group_name,
                    outcome = ?outcome,
                    body = %response.body,
                    "Processed alarm notification"
                );
                response
            }
            Err(e) => {
                warn!(group = %self.group_name, error = %e, "Alarm notification failed");
                HandlerResponse::error(format!("Error: {:#}", e))
            }
        }
    }

    async fn apply(&self, payload: &[u8]) -> Result<ScaleOutcome> {
        let envelope = SnsEnvelope::from_slice(payload)?;

        match envelope.alarm_state() {
            AlarmState::Cleared => Ok(ScaleOutcome::NoAction),
            AlarmState::Malformed => bail!(
                "Unrecognized alarm state in notification {:?}",
                envelope.subject()
            ),
            AlarmState::Active => {
                let group = self.api.describe_group(&self.group_name).await?;
                if group.max_size >= self.max_size_ceiling {
                    return Ok(ScaleOutcome::AlreadyAtCeiling {
                        max_size: group.max_size,
                    });
                }

                let new_max = group.max_size + 1;
                self.api.set_max_size(&self.group_name, new_max).await?;
                Ok(ScaleOutcome::Increased { new_max })
            }
        }
    }
}
