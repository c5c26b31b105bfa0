//! NATS JetStream consumer for alarm notifications

use crate::autoscaling::AutoscalingApi;
use crate::config::Config;
use crate::handler::ScaleAdjuster;
use crate::metrics::Metrics;
use anyhow::{Context, Result};
use async_nats::jetstream::{
    self,
    consumer::{AckPolicy, DeliverPolicy, PullConsumer},
    stream::Stream,
};
use futures_util::StreamExt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Notification consumer - subscribes to JetStream and feeds each alarm
/// notification through the scale adjuster.
pub struct NotificationConsumer<A: AutoscalingApi> {
    config: Config,
    adjuster: ScaleAdjuster<A>,
    metrics: Metrics,
}

impl<A: AutoscalingApi> NotificationConsumer<A> {
    pub fn new(config: Config, adjuster: ScaleAdjuster<A>, metrics: Metrics) -> Self {
        Self {
            config,
            adjuster,
            metrics,
        }
    }

    /// Run the consumer loop
    pub async fn run(&self) -> Result<()> {
        info!("Starting alarm notification consumer");

        let client = self.connect_nats().await?;
        let jetstream = jetstream::new(client);

        let stream = self.ensure_stream(&jetstream).await?;
        let consumer = self.create_consumer(&stream).await?;

        info!(
            consumer_name = %self.config.consumer_name,
            subject = %self.config.subject,
            "Consumer created successfully, starting message processing"
        );

        self.process_messages(consumer).await
    }

    /// Connect to NATS server
    async fn connect_nats(&self) -> Result<async_nats::Client> {
        info!("Connecting to NATS at {}", self.config.nats_url);

        let client = if let Some(creds_path) = &self.config.nats_creds_path {
            info!("Using credentials file: {}", creds_path);
            async_nats::ConnectOptions::new()
                .credentials_file(creds_path)
                .await
                .context("Failed to load NATS credentials")?
                .connect(&self.config.nats_url)
                .await
                .context("Failed to connect to NATS with credentials")?
        } else {
            warn!("No NATS credentials provided, connecting without auth");
            async_nats::connect(&self.config.nats_url)
                .await
                .context("Failed to connect to NATS")?
        };

        info!("Successfully connected to NATS");
        Ok(client)
    }

    /// Ensure JetStream stream exists
    async fn ensure_stream(&self, jetstream: &jetstream::Context) -> Result<Stream> {
        let stream_name = &self.config.stream_name;

        match jetstream.get_stream(stream_name).await {
            Ok(stream) => {
                info!("Found existing stream: {}", stream_name);
                Ok(stream)
            }
            Err(_) => {
                info!("Stream {} not found, creating it", stream_name);
                let stream_config = jetstream::stream::Config {
                    name: stream_name.clone(),
                    subjects: vec![self.config.subject.clone()],
                    max_age: Duration::from_secs(3600 * 24 * 7), // Retain for 7 days
                    ..Default::default()
                };

                let stream = jetstream
                    .get_or_create_stream(stream_config)
                    .await
                    .context("Failed to create JetStream stream")?;

                info!("Successfully created stream: {}", stream_name);
                Ok(stream)
            }
        }
    }

    /// Create durable JetStream consumer
    async fn create_consumer(&self, stream: &Stream) -> Result<PullConsumer> {
        let consumer_config = jetstream::consumer::pull::Config {
            durable_name: Some(self.config.consumer_name.clone()),
            filter_subject: self.config.subject.clone(),
            deliver_policy: DeliverPolicy::All,
            ack_policy: AckPolicy::Explicit,
            ack_wait: Duration::from_secs(30),
            ..Default::default()
        };

        let consumer = stream
            .get_or_create_consumer(&self.config.consumer_name, consumer_config)
            .await
            .context("Failed to create consumer")?;

        Ok(consumer)
    }

    /// Process messages continuously
    async fn process_messages(&self, consumer: PullConsumer) -> Result<()> {
        const BATCH_SIZE: usize = 10;
        const BATCH_TIMEOUT_SECS: u64 = 30;

        loop {
            let mut messages = consumer
                .batch()
                .max_messages(BATCH_SIZE)
                .expires(Duration::from_secs(BATCH_TIMEOUT_SECS))
                .messages()
                .await
                .context("Failed to fetch message batch")?;

            let mut batch_count = 0;

            while let Some(msg_result) = messages.next().await {
                match msg_result {
                    Ok(msg) => {
                        batch_count += 1;
                        self.handle_message(msg).await;
                    }
                    Err(e) => {
                        error!("Error receiving message: {}", e);
                        self.metrics
                            .record_error("receive_error", &self.config.asg_name);
                    }
                }
            }

            if batch_count > 0 {
                debug!("Processed batch of {} messages", batch_count);
            }

            // Small delay between batches to prevent tight-looping
            if batch_count == 0 {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    /// Handle a single message.
    ///
    /// The adjuster owns the catch-all boundary, so every message acks:
    /// a 500 response is the terminal outcome for that notification, and
    /// redelivery would only re-run the increment.
    async fn handle_message(&self, msg: async_nats::jetstream::Message) {
        debug!(
            subject = %msg.subject,
            payload_size = msg.payload.len(),
            "Processing alarm notification"
        );

        let response = self.adjuster.handle(&msg.payload).await;
        self.metrics
            .record_response(response.status_code, &self.config.asg_name);

        if response.status_code == 200 {
            debug!(body = %response.body, "Notification processed");
        } else {
            warn!(body = %response.body, "Notification processing failed");
        }

        if let Err(e) = msg.ack().await {
            error!("Failed to ack message: {}", e);
        }
    }
}
