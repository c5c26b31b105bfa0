//! Alarm Scale Handler - consumes monitoring alarm notifications and bumps
//! the placemark autoscaling group's max instance count
//!
//! This service subscribes to alarm notifications delivered over NATS
//! JetStream. Each active alarm triggers a bounded +1 increment of the
//! target group's MaxSize through the provider's autoscaling API, capped
//! at an operator-chosen ceiling. Every notification yields exactly one
//! `{statusCode, body}` response; failures never escape the handler.

pub mod autoscaling;
pub mod config;
pub mod consumer;
pub mod event;
pub mod handler;
pub mod metrics;

pub use autoscaling::{
    AutoscalingApi, DryRunAutoscalingClient, GroupDescriptor, HttpAutoscalingClient,
};
pub use config::Config;
pub use consumer::NotificationConsumer;
pub use event::{AlarmState, SnsEnvelope};
pub use handler::{HandlerResponse, ScaleAdjuster, ScaleOutcome};
pub use metrics::Metrics;
