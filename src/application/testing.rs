// Test doubles for the application ports
use crate::application::dashboard_api::{DashboardApi, DashboardApiError};
use crate::application::selection_store::SelectionStore;
use crate::application::view::{ControlPanel, PresentationSink, ViewError};
use crate::domain::command::{Command, ControlKind};
use crate::domain::device::{Device, DeviceId, DeviceOption};
use crate::domain::readings::{Channel, GraphsSnapshot};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

pub fn status_error(status: u16) -> DashboardApiError {
    DashboardApiError::Status {
        status,
        body: "boom".to_string(),
    }
}

/// Scripted backend. Queued responses are consumed first, then the default.
#[derive(Default)]
pub struct FakeApi {
    pub devices: Mutex<VecDeque<Result<Vec<Device>, DashboardApiError>>>,
    pub default_devices: Mutex<Vec<Device>>,
    pub graphs: Mutex<VecDeque<Result<GraphsSnapshot, DashboardApiError>>>,
    pub default_graphs: Mutex<GraphsSnapshot>,
    pub command_results: Mutex<VecDeque<Result<serde_json::Value, DashboardApiError>>>,
    pub device_calls: Mutex<u32>,
    pub graph_calls: Mutex<Vec<(DeviceId, u32)>>,
    pub commands: Mutex<Vec<Command>>,
    /// When set, graph requests never complete.
    pub hang_graphs: AtomicBool,
    pub cancelled_graphs: AtomicU32,
}

struct CancelGuard<'a>(&'a AtomicU32);

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl FakeApi {
    pub fn with_devices(devices: Vec<Device>) -> Self {
        let api = Self::default();
        *api.default_devices.lock().unwrap() = devices;
        api
    }

    pub fn push_devices(&self, result: Result<Vec<Device>, DashboardApiError>) {
        self.devices.lock().unwrap().push_back(result);
    }

    pub fn push_graphs(&self, result: Result<GraphsSnapshot, DashboardApiError>) {
        self.graphs.lock().unwrap().push_back(result);
    }

    pub fn push_command_result(&self, result: Result<serde_json::Value, DashboardApiError>) {
        self.command_results.lock().unwrap().push_back(result);
    }

    pub fn device_calls(&self) -> u32 {
        *self.device_calls.lock().unwrap()
    }

    pub fn graph_calls(&self) -> Vec<(DeviceId, u32)> {
        self.graph_calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn cancelled_graphs(&self) -> u32 {
        self.cancelled_graphs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn list_devices(&self) -> Result<Vec<Device>, DashboardApiError> {
        *self.device_calls.lock().unwrap() += 1;
        let queued = self.devices.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(self.default_devices.lock().unwrap().clone()))
    }

    async fn latest_graphs(
        &self,
        device_id: DeviceId,
        points: u32,
    ) -> Result<GraphsSnapshot, DashboardApiError> {
        self.graph_calls.lock().unwrap().push((device_id, points));
        if self.hang_graphs.load(Ordering::SeqCst) {
            let _guard = CancelGuard(&self.cancelled_graphs);
            std::future::pending::<()>().await;
        }
        let queued = self.graphs.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(self.default_graphs.lock().unwrap().clone()))
    }

    async fn submit_command(&self, command: &Command) -> Result<serde_json::Value, DashboardApiError> {
        self.commands.lock().unwrap().push(command.clone());
        let queued = self.command_results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(serde_json::json!({"id": 1, "status": "pending"})))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.set(key, value);
        store
    }
}

impl SelectionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

/// Records everything rendered. Elements can be removed to simulate a
/// partial page.
pub struct FakeView {
    pub options: Mutex<Vec<DeviceOption>>,
    pub thresholds: Mutex<HashMap<ControlKind, String>>,
    pub switches: Mutex<HashMap<ControlKind, bool>>,
    pub tiles: Mutex<HashMap<Channel, String>>,
    pub charts: Mutex<HashMap<Channel, (Vec<f64>, Vec<String>)>>,
    pub alerts: Mutex<Vec<String>>,
    pub missing: Mutex<Vec<&'static str>>,
}

impl Default for FakeView {
    fn default() -> Self {
        let thresholds = ControlKind::ALL.iter().map(|k| (*k, String::new())).collect();
        let switches = ControlKind::ALL.iter().map(|k| (*k, false)).collect();
        Self {
            options: Mutex::new(Vec::new()),
            thresholds: Mutex::new(thresholds),
            switches: Mutex::new(switches),
            tiles: Mutex::new(HashMap::new()),
            charts: Mutex::new(HashMap::new()),
            alerts: Mutex::new(Vec::new()),
            missing: Mutex::new(Vec::new()),
        }
    }
}

impl FakeView {
    pub fn remove_element(&self, id: &'static str) {
        self.missing.lock().unwrap().push(id);
    }

    pub fn options(&self) -> Vec<DeviceOption> {
        self.options.lock().unwrap().clone()
    }

    pub fn tile(&self, channel: Channel) -> Option<String> {
        self.tiles.lock().unwrap().get(&channel).cloned()
    }

    pub fn chart(&self, channel: Channel) -> Option<(Vec<f64>, Vec<String>)> {
        self.charts.lock().unwrap().get(&channel).cloned()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    fn check(&self, id: &'static str) -> Result<(), ViewError> {
        if self.missing.lock().unwrap().contains(&id) {
            Err(ViewError::MissingElement(id))
        } else {
            Ok(())
        }
    }
}

impl ControlPanel for FakeView {
    fn replace_device_options(&self, options: &[DeviceOption]) -> Result<(), ViewError> {
        self.check(crate::application::view::DEVICE_SELECT_ELEMENT)?;
        *self.options.lock().unwrap() = options.to_vec();
        Ok(())
    }

    fn threshold_input(&self, kind: ControlKind) -> Result<String, ViewError> {
        self.check(kind.threshold_element())?;
        Ok(self.thresholds.lock().unwrap()[&kind].clone())
    }

    fn set_threshold_input(&self, kind: ControlKind, value: &str) -> Result<(), ViewError> {
        self.check(kind.threshold_element())?;
        self.thresholds
            .lock()
            .unwrap()
            .insert(kind, value.to_string());
        Ok(())
    }

    fn switch_checked(&self, kind: ControlKind) -> Result<bool, ViewError> {
        self.check(kind.switch_element())?;
        Ok(self.switches.lock().unwrap()[&kind])
    }

    fn set_switch_checked(&self, kind: ControlKind, checked: bool) -> Result<(), ViewError> {
        self.check(kind.switch_element())?;
        self.switches.lock().unwrap().insert(kind, checked);
        Ok(())
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

impl PresentationSink for FakeView {
    fn show_tile(&self, channel: Channel, text: &str) -> Result<(), ViewError> {
        self.check(channel.tile_element())?;
        self.tiles.lock().unwrap().insert(channel, text.to_string());
        Ok(())
    }

    fn draw_chart(&self, channel: Channel, values: &[f64], labels: &[String]) -> Result<(), ViewError> {
        self.check(channel.chart_element())?;
        self.charts
            .lock()
            .unwrap()
            .insert(channel, (values.to_vec(), labels.to_vec()));
        Ok(())
    }
}
