//! Configuration for the load probe

use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

/// Configuration for the load probe
#[derive(Debug, Clone, Parser)]
#[command(name = "placemark-loadprobe")]
#[command(about = "Drives HTTP traffic against the placemark load balancer")]
pub struct Config {
    /// Base URL of the load balancer under test
    #[arg(long, env = "PROBE_HOST")]
    pub host: String,

    /// Number of simulated users
    #[arg(long, env = "PROBE_USERS", default_value_t = 10)]
    pub users: usize,

    /// Run duration in seconds
    #[arg(long, env = "PROBE_DURATION_SECS", default_value_t = 60)]
    pub duration_secs: u64,

    /// Minimum think time between actions, in milliseconds
    #[arg(long, env = "PROBE_THINK_TIME_MIN_MS", default_value_t = 1000)]
    pub think_time_min_ms: u64,

    /// Maximum think time between actions, in milliseconds
    #[arg(long, env = "PROBE_THINK_TIME_MAX_MS", default_value_t = 2000)]
    pub think_time_max_ms: u64,

    /// Relative weight of the authenticate task
    #[arg(long, env = "PROBE_AUTHENTICATE_WEIGHT", default_value_t = 1)]
    pub authenticate_weight: u32,

    /// Relative weight of the probe-metadata task
    #[arg(long, env = "PROBE_METADATA_WEIGHT", default_value_t = 1)]
    pub probe_weight: u32,

    /// Email for the fixed credential payload
    #[arg(long, env = "PROBE_EMAIL", default_value = "loadprobe@placemark.test")]
    pub email: String,

    /// Password for the fixed credential payload
    #[arg(long, env = "PROBE_PASSWORD", default_value = "loadprobe")]
    pub password: String,

    /// Output file for scraped records (defaults to a run-named file)
    #[arg(long, env = "PROBE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output logs in JSON format
    #[arg(long, env = "PROBE_LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// Parse configuration from command-line args and environment variables
    pub fn parse_config() -> Self {
        Config::parse()
    }

    /// Resolved output path; defaults to a file named for the test run.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "loadprobe-{}.log",
                Utc::now().format("%Y%m%dT%H%M%SZ")
            ))
        })
    }

    /// Think-time range in milliseconds, normalized so min <= max.
    pub fn think_time_ms(&self) -> (u64, u64) {
        if self.think_time_min_ms <= self.think_time_max_ms {
            (self.think_time_min_ms, self.think_time_max_ms)
        } else {
            (self.think_time_max_ms, self.think_time_min_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            host: "http://localhost:8080".to_string(),
            users: 10,
            duration_secs: 60,
            think_time_min_ms: 1000,
            think_time_max_ms: 2000,
            authenticate_weight: 1,
            probe_weight: 1,
            email: "loadprobe@placemark.test".to_string(),
            password: "loadprobe".to_string(),
            output: None,
            log_json: false,
        }
    }

    #[test]
    fn test_default_output_is_named_for_the_run() {
        let config = test_config();
        let path = config.output_path().display().to_string();
        assert!(path.starts_with("loadprobe-"));
        assert!(path.ends_with(".log"));
    }

    #[test]
    fn test_explicit_output_is_preserved() {
        let mut config = test_config();
        config.output = Some(PathBuf::from("/tmp/run.log"));
        assert_eq!(config.output_path(), PathBuf::from("/tmp/run.log"));
    }

    #[test]
    fn test_think_time_normalizes_inverted_range() {
        let mut config = test_config();
        config.think_time_min_ms = 5000;
        config.think_time_max_ms = 2000;
        assert_eq!(config.think_time_ms(), (2000, 5000));
    }
}
