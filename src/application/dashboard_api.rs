// Backend API trait for device, reading and command access
use crate::domain::command::Command;
use crate::domain::device::{Device, DeviceId};
use crate::domain::readings::GraphsSnapshot;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum DashboardApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// List registered devices in backend order
    async fn list_devices(&self) -> Result<Vec<Device>, DashboardApiError>;

    /// Latest `points` samples per channel for one device
    async fn latest_graphs(
        &self,
        device_id: DeviceId,
        points: u32,
    ) -> Result<GraphsSnapshot, DashboardApiError>;

    /// Submit an automation command, returning the server's acknowledgement body
    async fn submit_command(&self, command: &Command) -> Result<serde_json::Value, DashboardApiError>;
}
