//! Configuration for the alarm scale handler service

use clap::Parser;
use std::env;

/// Configuration for the alarm scale handler
#[derive(Debug, Clone, Parser)]
#[command(name = "placemark-scale-handler")]
#[command(about = "Consumes monitoring alarm notifications and bumps the autoscaling group max size")]
pub struct Config {
    /// NATS server URL
    #[arg(long, env)]
    pub nats_url: String,

    /// Path to NATS credentials file
    #[arg(long, env)]
    pub nats_creds_path: Option<String>,

    /// JetStream stream name
    #[arg(long, env)]
    pub stream_name: String,

    /// Subject the monitoring system publishes alarm notifications on
    #[arg(long, env)]
    pub subject: String,

    /// Consumer name (for durable JetStream consumer)
    #[arg(long, env)]
    pub consumer_name: String,

    /// Name of the target autoscaling group
    #[arg(long, env = "ASG_NAME")]
    pub asg_name: String,

    /// Base URL of the autoscaling API (omit for dry-run mode)
    #[arg(long, env)]
    pub autoscaling_endpoint: Option<String>,

    /// Autoscaling API timeout in seconds
    #[arg(long, env)]
    pub autoscaling_timeout_secs: u64,

    /// Hard ceiling for the group's max size
    #[arg(long, env)]
    pub max_size_ceiling: u32,

    /// Dry-run mode (log updates instead of sending them)
    #[arg(long, env)]
    pub dry_run: bool,

    /// Output logs in JSON format
    #[arg(long, env)]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nats_url: env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string()),
            nats_creds_path: env::var("NATS_CREDS_PATH").ok(),
            stream_name: env::var("STREAM_NAME").unwrap_or_else(|_| "ALARM_NOTIFICATIONS".to_string()),
            subject: env::var("SUBJECT")
                .unwrap_or_else(|_| "placemark.alarms.v1.notifications".to_string()),
            consumer_name: env::var("CONSUMER_NAME")
                .unwrap_or_else(|_| "alarm-scale-handler".to_string()),
            asg_name: env::var("ASG_NAME").unwrap_or_else(|_| "placemark-asg".to_string()),
            autoscaling_endpoint: env::var("AUTOSCALING_ENDPOINT").ok(),
            autoscaling_timeout_secs: env::var("AUTOSCALING_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            max_size_ceiling: env::var("MAX_SIZE_CEILING")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            dry_run: env::var("DRY_RUN")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            log_json: env::var("LOG_JSON")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }
}

impl Config {
    /// Parse configuration from command-line args and environment variables
    pub fn parse_config() -> Self {
        Config::parse()
    }

    /// Check if a live autoscaling endpoint is configured
    pub fn has_autoscaling_endpoint(&self) -> bool {
        self.autoscaling_endpoint.is_some() && !self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            nats_url: "nats://localhost:4222".to_string(),
            nats_creds_path: None,
            stream_name: "ALARM_NOTIFICATIONS".to_string(),
            subject: "placemark.alarms.v1.notifications".to_string(),
            consumer_name: "test-consumer".to_string(),
            asg_name: "placemark-asg".to_string(),
            autoscaling_endpoint: None,
            autoscaling_timeout_secs: 10,
            max_size_ceiling: 10,
            dry_run: true,
            log_json: false,
        }
    }

    #[test]
    fn test_has_autoscaling_endpoint() {
        let mut config = test_config();
        config.autoscaling_endpoint = Some("http://autoscaling:8080".to_string());

        // Dry-run mode disables live updates
        assert!(!config.has_autoscaling_endpoint());

        config.dry_run = false;
        assert!(config.has_autoscaling_endpoint());

        config.autoscaling_endpoint = None;
        assert!(!config.has_autoscaling_endpoint());
    }
}
