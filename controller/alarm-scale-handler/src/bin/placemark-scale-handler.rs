//! Alarm scale handler binary - consumes alarm notifications and bumps the
//! autoscaling group's max size

use alarm_scale_handler::{
    AutoscalingApi, Config, DryRunAutoscalingClient, HttpAutoscalingClient, Metrics,
    NotificationConsumer, ScaleAdjuster,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse_config();

    if config.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    info!("Starting Placemark Alarm Scale Handler");
    info!("Configuration:");
    info!("  NATS URL: {}", config.nats_url);
    info!("  Stream: {}", config.stream_name);
    info!("  Consumer: {}", config.consumer_name);
    info!("  Subject: {}", config.subject);
    info!("  Autoscaling group: {}", config.asg_name);
    info!("  Max size ceiling: {}", config.max_size_ceiling);
    info!("  Dry-run: {}", config.dry_run);

    if config.has_autoscaling_endpoint() {
        let endpoint = config.autoscaling_endpoint.clone().unwrap();
        info!("Using HTTP autoscaling client with endpoint: {}", endpoint);

        let api = Arc::new(HttpAutoscalingClient::new(
            endpoint,
            config.autoscaling_timeout_secs,
        )?);

        run_consumer(config, api).await
    } else {
        info!("Using dry-run autoscaling client");
        let api = Arc::new(DryRunAutoscalingClient::default());
        run_consumer(config, api).await
    }
}

/// Run the consumer with the specified autoscaling API
async fn run_consumer<A: AutoscalingApi + 'static>(
    config: Config,
    api: Arc<A>,
) -> anyhow::Result<()> {
    let adjuster = ScaleAdjuster::new(api, config.asg_name.clone(), config.max_size_ceiling);
    let consumer = NotificationConsumer::new(config, adjuster, Metrics);

    match consumer.run().await {
        Ok(()) => {
            info!("Alarm notification consumer exited normally");
            Ok(())
        }
        Err(e) => {
            error!("Alarm notification consumer failed: {}", e);
            Err(e)
        }
    }
}
