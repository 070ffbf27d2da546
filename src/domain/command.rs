// Automation command domain models
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::device::DeviceId;

/// Which automation a threshold/switch pair controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Watering,
    Lighting,
}

impl ControlKind {
    pub const ALL: [ControlKind; 2] = [ControlKind::Watering, ControlKind::Lighting];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Watering => "watering",
            ControlKind::Lighting => "lighting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "watering" => Some(ControlKind::Watering),
            "lighting" => Some(ControlKind::Lighting),
            _ => None,
        }
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            ControlKind::Watering => "set_watering",
            ControlKind::Lighting => "set_lighting",
        }
    }

    /// Durable storage key for the last saved threshold.
    pub fn storage_key(&self) -> &'static str {
        match self {
            ControlKind::Watering => "wateringThreshold",
            ControlKind::Lighting => "lightingThreshold",
        }
    }

    pub fn threshold_element(&self) -> &'static str {
        self.storage_key()
    }

    pub fn switch_element(&self) -> &'static str {
        match self {
            ControlKind::Watering => "autoSwitch",
            ControlKind::Lighting => "manualSwitch",
        }
    }
}

/// Threshold input parsing: empty or unparsable input counts as zero.
pub fn parse_threshold(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandPayload {
    #[serde(serialize_with = "serialize_threshold")]
    pub threshold: f64,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Body of `POST /api/commands`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub device_id: DeviceId,
    pub command: &'static str,
    pub payload_json: CommandPayload,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Command {
    pub fn new(device_id: DeviceId, kind: ControlKind, threshold: f64, enabled: bool) -> Self {
        Self {
            device_id,
            command: kind.command_name(),
            payload_json: CommandPayload {
                threshold,
                enabled,
                kind: kind.as_str(),
            },
            scheduled_at: None,
        }
    }
}

// Whole numbers go out as JSON integers
fn serialize_threshold<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
