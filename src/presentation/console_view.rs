// Console rendering of the dashboard controls, tiles and charts
use crate::application::view::{ControlPanel, PresentationSink, ViewError};
use crate::domain::command::ControlKind;
use crate::domain::device::DeviceOption;
use crate::domain::readings::Channel;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Default)]
struct ConsoleState {
    options: Vec<DeviceOption>,
    thresholds: HashMap<ControlKind, String>,
    switches: HashMap<ControlKind, bool>,
    tiles: HashMap<Channel, String>,
    charts: HashMap<Channel, String>,
}

/// Headless stand-in for the web page: keeps control state in memory and
/// prints what a browser would draw.
#[derive(Debug, Default)]
pub struct ConsoleView {
    state: Mutex<ConsoleState>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ConsoleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One-screen summary for the `status` command.
    pub fn summary(&self) -> String {
        let state = self.state();
        let device = state
            .options
            .iter()
            .find(|o| o.selected)
            .map(|o| o.text.as_str())
            .unwrap_or("-");

        let mut lines = vec![format!("device: {}", device)];
        for channel in Channel::ALL {
            let tile = state.tiles.get(&channel).map(String::as_str).unwrap_or("--");
            let chart = state.charts.get(&channel).map(String::as_str).unwrap_or("");
            lines.push(format!("{:<12} {:<8} {}", channel.as_str(), tile, chart).trim_end().to_string());
        }
        for kind in ControlKind::ALL {
            let threshold = state.thresholds.get(&kind).map(String::as_str).unwrap_or("");
            let on = state.switches.get(&kind).copied().unwrap_or(false);
            lines.push(format!(
                "{:<12} threshold={} {}",
                kind.as_str(),
                if threshold.is_empty() { "-" } else { threshold },
                if on { "on" } else { "off" }
            ));
        }
        lines.join("\n")
    }
}

impl ControlPanel for ConsoleView {
    fn replace_device_options(&self, options: &[DeviceOption]) -> Result<(), ViewError> {
        let mut state = self.state();
        if state.options != options {
            let rendered: Vec<String> = options.iter().map(format_option).collect();
            println!("devices: {}", rendered.join("  "));
        }
        state.options = options.to_vec();
        Ok(())
    }

    fn threshold_input(&self, kind: ControlKind) -> Result<String, ViewError> {
        Ok(self.state().thresholds.get(&kind).cloned().unwrap_or_default())
    }

    fn set_threshold_input(&self, kind: ControlKind, value: &str) -> Result<(), ViewError> {
        tracing::trace!(element = kind.threshold_element(), value, "Threshold input set");
        self.state().thresholds.insert(kind, value.to_string());
        Ok(())
    }

    fn switch_checked(&self, kind: ControlKind) -> Result<bool, ViewError> {
        Ok(self.state().switches.get(&kind).copied().unwrap_or(false))
    }

    fn set_switch_checked(&self, kind: ControlKind, checked: bool) -> Result<(), ViewError> {
        tracing::trace!(element = kind.switch_element(), checked, "Switch set");
        self.state().switches.insert(kind, checked);
        Ok(())
    }

    fn alert(&self, message: &str) {
        eprintln!("!! {}", message);
    }
}

impl PresentationSink for ConsoleView {
    fn show_tile(&self, channel: Channel, text: &str) -> Result<(), ViewError> {
        let previous = self.state().tiles.insert(channel, text.to_string());
        tracing::trace!(element = channel.tile_element(), text, "Tile updated");
        if previous.as_deref() != Some(text) {
            println!("{:<12} {}", channel.as_str(), text);
        }
        Ok(())
    }

    fn draw_chart(&self, channel: Channel, values: &[f64], labels: &[String]) -> Result<(), ViewError> {
        let first = labels.first().map(String::as_str).unwrap_or("");
        let last = labels.last().map(String::as_str).unwrap_or("");
        let line = format!("{} {}..{}", sparkline(values), first, last);
        tracing::debug!(chart = channel.chart_element(), points = values.len(), "{}", line);
        self.state().charts.insert(channel, line);
        Ok(())
    }
}

fn format_option(option: &DeviceOption) -> String {
    match (option.value, option.selected) {
        (Some(id), true) => format!("[{}: {}]", id, option.text),
        (Some(id), false) => format!("{}: {}", id, option.text),
        (None, _) => format!("({})", option.text),
    }
}

/// Scale `values` onto eight bar heights.
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARK_BARS[0]
            } else {
                let idx = ((v - min) / span * (SPARK_BARS.len() - 1) as f64).round() as usize;
                SPARK_BARS[idx.min(SPARK_BARS.len() - 1)]
            }
        })
        .collect()
}
