// Device domain model
use serde::Deserialize;

pub type DeviceId = i64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Device {
    #[cfg(test)]
    pub fn new(id: DeviceId, label: Option<&str>, name: Option<&str>) -> Self {
        Self {
            id,
            label: label.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    /// Label first, then name, then a generated "Device {id}".
    /// Blank strings count as missing.
    pub fn display_name(&self) -> String {
        [&self.label, &self.name]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Device {}", self.id))
    }
}

/// One entry of the device dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceOption {
    pub value: Option<DeviceId>,
    pub text: String,
    pub selected: bool,
    pub disabled: bool,
}

impl DeviceOption {
    pub const NO_DEVICES: &'static str = "No devices";

    /// The lone disabled entry shown when the backend has no devices.
    pub fn placeholder() -> Self {
        Self {
            value: None,
            text: Self::NO_DEVICES.to_string(),
            selected: true,
            disabled: true,
        }
    }

    pub fn for_device(device: &Device, selected_id: DeviceId) -> Self {
        Self {
            value: Some(device.id),
            text: device.display_name(),
            selected: device.id == selected_id,
            disabled: false,
        }
    }
}
