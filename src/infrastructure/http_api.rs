// HTTP backend implementation of the dashboard API
use crate::application::dashboard_api::{DashboardApi, DashboardApiError};
use crate::domain::command::Command;
use crate::domain::device::{Device, DeviceId};
use crate::domain::readings::GraphsSnapshot;
use crate::infrastructure::config::BackendSettings;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    http_client: Client,
    base_url: String,
}

impl HttpDashboardApi {
    pub fn new(settings: &BackendSettings) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Response, DashboardApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DashboardApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DashboardApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| DashboardApiError::Transport(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(
                error = %e,
                body_preview = %text.chars().take(200).collect::<String>(),
                "Unexpected response body"
            );
            DashboardApiError::Decode(e.to_string())
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DashboardApiError> {
        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DashboardApiError::Transport(e.to_string()))?;

        Self::decode(Self::check(response).await?).await
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn list_devices(&self) -> Result<Vec<Device>, DashboardApiError> {
        self.get_json(&self.url("/api/devices")).await
    }

    async fn latest_graphs(
        &self,
        device_id: DeviceId,
        points: u32,
    ) -> Result<GraphsSnapshot, DashboardApiError> {
        let url = self.url(&format!(
            "/api/graphs/latest?device_id={}&points={}",
            device_id, points
        ));
        self.get_json(&url).await
    }

    async fn submit_command(&self, command: &Command) -> Result<serde_json::Value, DashboardApiError> {
        let response = self
            .http_client
            .post(self.url("/api/commands"))
            .json(command)
            .send()
            .await
            .map_err(|e| DashboardApiError::Transport(e.to_string()))?;

        Self::decode(Self::check(response).await?).await
    }
}
