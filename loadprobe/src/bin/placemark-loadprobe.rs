//! Load probe binary - drives HTTP traffic against the placemark load
//! balancer and scrapes the instance marker from about-page responses

use anyhow::Result;
use loadprobe::{runner, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
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

    runner::run(&config).await?;
    Ok(())
}
