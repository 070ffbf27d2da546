use crate::application::refresh_scheduler::RefreshSettings;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub backend: BackendSettings,
    pub refresh: RefreshConfig,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    pub readings_interval_secs: u64,
    pub devices_interval_secs: u64,
    pub latest_points: u32,
    pub chart_points: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: PathBuf,
}

impl RefreshConfig {
    pub fn to_settings(&self) -> RefreshSettings {
        RefreshSettings {
            readings_interval: Duration::from_secs(self.readings_interval_secs.max(1)),
            devices_interval: Duration::from_secs(self.devices_interval_secs.max(1)),
            latest_points: self.latest_points.max(1),
            chart_points: self.chart_points.max(1),
        }
    }
}

fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("backend.base_url", "http://127.0.0.1:8000")?
        .set_default("refresh.readings_interval_secs", 5)?
        .set_default("refresh.devices_interval_secs", 30)?
        .set_default("refresh.latest_points", 1)?
        .set_default("refresh.chart_points", 50)?
        .set_default("storage.path", ".dashboard-state.json")?)
}

/// Defaults, then `config/dashboard.*` if present, then `DASHBOARD__*` variables
/// (e.g. `DASHBOARD__BACKEND__BASE_URL`).
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
