// Device registry - Keeps the device list and the authoritative selection
use crate::application::dashboard_api::{DashboardApi, DashboardApiError};
use crate::application::selection::DeviceSelection;
use crate::application::selection_store::{SELECTED_DEVICE_KEY, SelectionStore};
use crate::application::view::ControlPanel;
use crate::domain::device::{Device, DeviceId, DeviceOption};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("device {0} is not in the current device list")]
    UnknownDevice(DeviceId),
}

pub struct DeviceRegistry {
    api: Arc<dyn DashboardApi>,
    selection: Arc<DeviceSelection>,
    store: Arc<dyn SelectionStore>,
    controls: Arc<dyn ControlPanel>,
    devices: RwLock<Vec<Device>>,
}

impl DeviceRegistry {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        selection: Arc<DeviceSelection>,
        store: Arc<dyn SelectionStore>,
        controls: Arc<dyn ControlPanel>,
    ) -> Self {
        Self {
            api,
            selection,
            store,
            controls,
            devices: RwLock::new(Vec::new()),
        }
    }

    /// Devices from the last successful refresh.
    pub async fn devices(&self) -> Vec<Device> {
        self.devices.read().await.clone()
    }

    /// Fetch the device list, pick the selected device and rebuild the dropdown.
    ///
    /// A failed fetch leaves both the selection and the dropdown untouched.
    pub async fn refresh(&self) -> Result<Vec<Device>, DashboardApiError> {
        let devices = match self.api.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch device list");
                return Err(e);
            }
        };

        if devices.is_empty() {
            self.selection.set(None);
            *self.devices.write().await = devices;
            self.render(&[DeviceOption::placeholder()]);
            tracing::info!("Backend reports no devices");
            return Ok(Vec::new());
        }

        let persisted = self
            .store
            .get(SELECTED_DEVICE_KEY)
            .and_then(|raw| raw.trim().parse::<DeviceId>().ok());

        // Read and write the selection in one step so a user switch that
        // already landed is not lost
        let mut selected = 0;
        self.selection.resolve(|current| {
            selected = resolve_selection(&devices, current, persisted);
            Some(selected)
        });

        self.render_devices(&devices, selected);

        *self.devices.write().await = devices.clone();
        tracing::debug!(device_id = selected, count = devices.len(), "Device list refreshed");

        Ok(devices)
    }

    /// Dropdown change: make `id` current and remember it across restarts.
    pub async fn select(&self, id: DeviceId) -> Result<(), SelectionError> {
        let devices = self.devices.read().await;
        if !devices.iter().any(|d| d.id == id) {
            return Err(SelectionError::UnknownDevice(id));
        }

        self.selection.set(Some(id));
        self.store.set(SELECTED_DEVICE_KEY, &id.to_string());
        self.render_devices(&devices, id);
        tracing::info!(device_id = id, "Device selected");
        Ok(())
    }

    fn render_devices(&self, devices: &[Device], selected: DeviceId) {
        let options: Vec<DeviceOption> = devices
            .iter()
            .map(|d| DeviceOption::for_device(d, selected))
            .collect();
        self.render(&options);
    }

    fn render(&self, options: &[DeviceOption]) {
        if let Err(e) = self.controls.replace_device_options(options) {
            tracing::warn!(error = %e, "Device dropdown not rendered");
        }
    }
}

/// Winning device id for a non-empty list: the in-memory selection if still
/// present, else the persisted one if present, else the first device.
pub fn resolve_selection(
    devices: &[Device],
    current: Option<DeviceId>,
    persisted: Option<DeviceId>,
) -> DeviceId {
    let known = |id: &DeviceId| devices.iter().any(|d| d.id == *id);

    current
        .filter(known)
        .or(persisted.filter(known))
        .or(devices.first().map(|d| d.id))
        .unwrap_or_default()
}
