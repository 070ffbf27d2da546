// View ports - what the services need from whatever renders the dashboard
use crate::domain::command::ControlKind;
use crate::domain::device::DeviceOption;
use crate::domain::readings::Channel;

pub const DEVICE_SELECT_ELEMENT: &str = "deviceSelect";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("missing element #{0}")]
    MissingElement(&'static str),
}

/// Operator-facing controls: device dropdown, threshold inputs, switches.
pub trait ControlPanel: Send + Sync {
    /// Replace every dropdown option with `options`.
    fn replace_device_options(&self, options: &[DeviceOption]) -> Result<(), ViewError>;

    /// Raw text of the threshold input for `kind`.
    fn threshold_input(&self, kind: ControlKind) -> Result<String, ViewError>;

    fn set_threshold_input(&self, kind: ControlKind, value: &str) -> Result<(), ViewError>;

    fn switch_checked(&self, kind: ControlKind) -> Result<bool, ViewError>;

    fn set_switch_checked(&self, kind: ControlKind, checked: bool) -> Result<(), ViewError>;

    /// Blocking notice the operator has to acknowledge.
    fn alert(&self, message: &str);
}

/// Numeric tiles and charts.
pub trait PresentationSink: Send + Sync {
    fn show_tile(&self, channel: Channel, text: &str) -> Result<(), ViewError>;

    fn draw_chart(&self, channel: Channel, values: &[f64], labels: &[String]) -> Result<(), ViewError>;
}
