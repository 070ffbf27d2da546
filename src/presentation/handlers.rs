// Operator input handlers - one line of stdin per user interaction
use crate::domain::command::ControlKind;
use crate::domain::device::{DeviceId, DeviceOption};
use crate::presentation::app_state::Dashboard;
use crate::presentation::console_view::ConsoleView;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
commands:
  devices                             list devices
  select <id>                         switch device
  threshold <watering|lighting> <n>   save a threshold and send it
  auto <on|off>                       auto-watering switch
  manual <on|off>                     manual-lighting switch
  refresh                             poll readings now
  status                              show tiles and controls
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    Devices,
    Select(DeviceId),
    Threshold(ControlKind, String),
    Switch(ControlKind, bool),
    Refresh,
    Status,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl OperatorCommand {
    pub fn parse(line: &str) -> Result<Option<Self>, InputError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (verb.to_ascii_lowercase().as_str(), args) {
            ("devices", []) => OperatorCommand::Devices,
            ("select", [id]) => OperatorCommand::Select(
                id.parse().map_err(|_| InputError::Usage("select <id>"))?,
            ),
            ("select", _) => return Err(InputError::Usage("select <id>")),
            ("threshold", [kind, value]) => OperatorCommand::Threshold(
                ControlKind::parse(kind)
                    .ok_or(InputError::Usage("threshold <watering|lighting> <n>"))?,
                value.to_string(),
            ),
            ("threshold", _) => return Err(InputError::Usage("threshold <watering|lighting> <n>")),
            ("auto", [state]) => OperatorCommand::Switch(
                ControlKind::Watering,
                parse_switch(state).ok_or(InputError::Usage("auto <on|off>"))?,
            ),
            ("auto", _) => return Err(InputError::Usage("auto <on|off>")),
            ("manual", [state]) => OperatorCommand::Switch(
                ControlKind::Lighting,
                parse_switch(state).ok_or(InputError::Usage("manual <on|off>"))?,
            ),
            ("manual", _) => return Err(InputError::Usage("manual <on|off>")),
            ("refresh", []) => OperatorCommand::Refresh,
            ("status", []) => OperatorCommand::Status,
            ("help" | "?", _) => OperatorCommand::Help,
            ("quit" | "exit", _) => OperatorCommand::Quit,
            _ => return Err(InputError::Unknown(line.trim().to_string())),
        };

        Ok(Some(command))
    }
}

fn parse_switch(state: &str) -> Option<bool> {
    match state.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Some(true),
        "off" | "0" | "false" => Some(false),
        _ => None,
    }
}

/// Apply one operator command. Returns false when the operator asked to quit.
pub async fn handle_command(dashboard: &Dashboard, view: &ConsoleView, command: OperatorCommand) -> bool {
    match command {
        OperatorCommand::Devices => {
            let devices = dashboard.registry.devices().await;
            if devices.is_empty() {
                println!("  {}", DeviceOption::NO_DEVICES);
            }
            let current = dashboard.selection.current();
            for device in devices {
                let marker = if current == Some(device.id) { "*" } else { " " };
                println!("{} {:>4}  {}", marker, device.id, device.display_name());
            }
        }
        OperatorCommand::Select(id) => {
            if let Err(e) = dashboard.select_device(id).await {
                println!("{}", e);
            }
        }
        OperatorCommand::Threshold(kind, value) => {
            if let Err(e) = dashboard.edit_threshold(kind, &value).await {
                tracing::debug!(error = %e, "Threshold command not sent");
            }
        }
        OperatorCommand::Switch(kind, checked) => {
            if let Err(e) = dashboard.toggle_switch(kind, checked).await {
                tracing::debug!(error = %e, "Switch command not sent");
            }
        }
        OperatorCommand::Refresh => dashboard.refresh_now().await,
        OperatorCommand::Status => println!("{}", view.summary()),
        OperatorCommand::Help => println!("{}", HELP),
        OperatorCommand::Quit => return false,
    }
    true
}

/// Read operator commands from stdin until `quit` or end of input.
pub async fn run_operator_console(dashboard: Arc<Dashboard>, view: Arc<ConsoleView>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match OperatorCommand::parse(&line) {
            Ok(Some(command)) => {
                if !handle_command(&dashboard, &view, command).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}
