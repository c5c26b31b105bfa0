//! Autoscaling API trait and implementations
//!
//! The provider's autoscaling service exposes describe/update operations
//! over HTTP. A dry-run implementation logs updates instead of sending
//! them.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// Autoscaling group attributes as returned by the describe operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDescriptor {
    #[serde(rename = "AutoScalingGroupName")]
    pub auto_scaling_group_name: String,
    #[serde(rename = "MinSize")]
    pub min_size: u32,
    #[serde(rename = "MaxSize")]
    pub max_size: u32,
    #[serde(rename = "DesiredCapacity")]
    pub desired_capacity: u32,
}

/// Autoscaling API - implement this to integrate with different providers
#[async_trait]
pub trait AutoscalingApi: Send + Sync {
    /// Fetch the current attributes of a group.
    async fn describe_group(&self, name: &str) -> Result<GroupDescriptor>;

    /// Set the group's MaxSize.
    async fn set_max_size(&self, name: &str, max_size: u32) -> Result<()>;
}

/// HTTP autoscaling client against the provider's REST endpoint.
pub struct HttpAutoscalingClient {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct UpdateMaxSizeRequest {
    #[serde(rename = "MaxSize")]
    max_size: u32,
}

impl HttpAutoscalingClient {
    pub fn new(endpoint: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn group_url(&self, name: &str) -> String {
        format!("{}/groups/{}", self.endpoint, name)
    }
}

#[async_trait]
impl AutoscalingApi for HttpAutoscalingClient {
    async fn describe_group(&self, name: &str) -> Result<GroupDescriptor> {
        let response = self
            .client
            .get(self.group_url(name))
            .send()
            .await
            .context("Describe group request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read body>".to_string());
            bail!(
                "Autoscaling API returned error status {} describing group {}: {}",
                status,
                name,
                body
            );
        }

        response
            .json::<GroupDescriptor>()
            .await
            .context("Invalid describe group response")
    }

    async fn set_max_size(&self, name: &str, max_size: u32) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/max-size", self.group_url(name)))
            .json(&UpdateMaxSizeRequest { max_size })
            .send()
            .await
            .context("Update group request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read body>".to_string());
            bail!(
                "Autoscaling API returned error status {} updating group {}: {}",
                status,
                name,
                body
            );
        }

        info!(group = %name, max_size, "Updated autoscaling group max size");
        Ok(())
    }
}

/// Dry-run autoscaling client. Describe reports a fixed group; updates are
/// logged, never sent. The reported max size tracks logged updates so a
/// dry run still converges on the ceiling.
pub struct DryRunAutoscalingClient {
    max_size: Mutex<u32>,
}

impl DryRunAutoscalingClient {
    pub fn new(initial_max_size: u32) -> Self {
        Self {
            max_size: Mutex::new(initial_max_size),
        }
    }
}

impl Default for DryRunAutoscalingClient {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl AutoscalingApi for DryRunAutoscalingClient {
    async fn describe_group(&self, name: &str) -> Result<GroupDescriptor> {
        let max_size = *self.max_size.lock().expect("dry-run state poisoned");
        Ok(GroupDescriptor {
            auto_scaling_group_name: name.to_string(),
            min_size: 1,
            max_size,
            desired_capacity: 1,
        })
    }

    async fn set_max_size(&self, name: &str, max_size: u32) -> Result<()> {
        *self.max_size.lock().expect("dry-run state poisoned") = max_size;
        info!(
            group = %name,
            max_size,
            "Would update autoscaling group max size (dry-run mode)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = HttpAutoscalingClient::new("http://localhost:8080/autoscaling".into(), 10);
        assert!(client.is_ok());
    }

    #[test]
    fn test_group_url_trims_trailing_slash() {
        let client =
            HttpAutoscalingClient::new("http://localhost:8080/autoscaling/".into(), 10).unwrap();
        assert_eq!(
            client.group_url("asg-1"),
            "http://localhost:8080/autoscaling/groups/asg-1"
        );
    }

    #[tokio::test]
    async fn test_dry_run_client_tracks_updates() {
        let client = DryRunAutoscalingClient::new(3);

        let group = client.describe_group("asg-1").await.unwrap();
        assert_eq!(group.max_size, 3);

        client.set_max_size("asg-1", 4).await.unwrap();
        let group = client.describe_group("asg-1").await.unwrap();
        assert_eq!(group.max_size, 4);
    }

    #[test]
    fn test_descriptor_wire_names() {
        let group: GroupDescriptor = serde_json::from_value(serde_json::json!({
            "AutoScalingGroupName": "asg-1",
            "MinSize": 1,
            "MaxSize": 3,
            "DesiredCapacity": 2
        }))
        .unwrap();
        assert_eq!(group.auto_scaling_group_name, "asg-1");
        assert_eq!(group.max_size, 3);
    }
}
