// Command dispatcher - Use case for pushing threshold/automation settings
use crate::application::dashboard_api::{DashboardApi, DashboardApiError};
use crate::application::selection::DeviceSelection;
use crate::application::selection_store::SelectionStore;
use crate::application::view::{ControlPanel, ViewError};
use crate::domain::command::{parse_threshold, Command, ControlKind};
use std::sync::Arc;

pub const NO_DEVICE_ALERT: &str =
    "No device selected (the device list is empty or has not loaded yet).";
pub const COMMAND_REJECTED_ALERT: &str = "Failed to save the command (see logs).";
pub const CONNECTION_ALERT: &str = "Could not reach the API.";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no device selected")]
    NoDeviceSelected,

    #[error("control missing: {0}")]
    MissingControl(#[from] ViewError),

    #[error(transparent)]
    Api(#[from] DashboardApiError),
}

#[derive(Clone)]
pub struct CommandDispatcher {
    api: Arc<dyn DashboardApi>,
    selection: Arc<DeviceSelection>,
    store: Arc<dyn SelectionStore>,
    controls: Arc<dyn ControlPanel>,
}

impl CommandDispatcher {
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
        }
    }

    /// Send the threshold and switch state for `kind` to the selected device.
    ///
    /// Nothing is sent without a selected device (the operator is alerted) or
    /// without both controls on the page (logged only).
    pub async fn send(&self, kind: ControlKind) -> Result<(), CommandError> {
        let Some(device_id) = self.selection.current() else {
            self.controls.alert(NO_DEVICE_ALERT);
            return Err(CommandError::NoDeviceSelected);
        };

        let (raw_threshold, enabled) = match self.read_controls(kind) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(error = %e, kind = kind.as_str(), "Threshold or switch control missing");
                return Err(e.into());
            }
        };

        let command = Command::new(device_id, kind, parse_threshold(&raw_threshold), enabled);

        match self.api.submit_command(&command).await {
            Ok(ack) => {
                tracing::info!(device_id, command = command.command, ack = %ack, "Command saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(device_id, command = command.command, error = %e, "Command failed");
                let notice = match &e {
                    DashboardApiError::Status { .. } => COMMAND_REJECTED_ALERT,
                    _ => CONNECTION_ALERT,
                };
                self.controls.alert(notice);
                Err(e.into())
            }
        }
    }

    /// Remember a threshold and immediately send it.
    pub async fn save_threshold(&self, kind: ControlKind, value: &str) -> Result<(), CommandError> {
        self.store.set(kind.storage_key(), value);
        tracing::info!(kind = kind.as_str(), value, "Threshold saved");
        self.send(kind).await
    }

    /// Auto-watering switch toggled. Turning it on clears the manual-lighting switch.
    pub async fn auto(&self) -> Result<(), CommandError> {
        tracing::debug!("Auto watering toggled");
        if let Ok(true) = self.controls.switch_checked(ControlKind::Watering) {
            if let Err(e) = self
                .controls
                .set_switch_checked(ControlKind::Lighting, false)
            {
                tracing::debug!(error = %e, "Manual switch not cleared");
            }
        }
        self.send(ControlKind::Watering).await
    }

    /// Manual-lighting switch toggled.
    pub async fn manual(&self) -> Result<(), CommandError> {
        tracing::debug!("Manual lighting toggled");
        self.send(ControlKind::Lighting).await
    }

    /// Put saved thresholds back into their inputs.
    pub fn restore_thresholds(&self) {
        for kind in ControlKind::ALL {
            let Some(value) = self.store.get(kind.storage_key()) else {
                continue;
            };
            if let Err(e) = self.controls.set_threshold_input(kind, &value) {
                tracing::warn!(error = %e, kind = kind.as_str(), "Threshold not restored");
            }
        }
    }

    fn read_controls(&self, kind: ControlKind) -> Result<(String, bool), ViewError> {
        let threshold = self.controls.threshold_input(kind)?;
        let enabled = self.controls.switch_checked(kind)?;
        Ok((threshold, enabled))
    }
}
