// Sensor reading domain models
use serde::Deserialize;

/// One sensor type's time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Temperature,
    Humidity,
    Soil,
    Light,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::Soil,
        Channel::Light,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Soil => "soil",
            Channel::Light => "light",
        }
    }

    /// Decimal places shown on the channel's tile.
    pub fn precision(&self) -> usize {
        match self {
            Channel::Light => 0,
            _ => 1,
        }
    }

    pub fn tile_element(&self) -> &'static str {
        match self {
            Channel::Temperature => "tempValue",
            Channel::Humidity => "humValue",
            Channel::Soil => "soilValue",
            Channel::Light => "lightValue",
        }
    }

    pub fn chart_element(&self) -> &'static str {
        match self {
            Channel::Temperature => "tempChart",
            Channel::Humidity => "humChart",
            Channel::Soil => "soilChart",
            Channel::Light => "lightChart",
        }
    }

    /// Format a value for the tile.
    ///
    /// Rounds the exact binary value, so 0.15 (stored as 0.1499...) shows
    /// "0.1". Exact halves such as 2.5 or 0.25 round away from zero.
    pub fn format_value(&self, value: f64) -> String {
        let precision = self.precision();
        if is_exact_half(value.abs(), precision) {
            let factor = 10f64.powi(precision as i32);
            let rounded = (value.abs() * factor).ceil() / factor;
            return format!("{:.*}", precision, rounded.copysign(value));
        }
        format!("{:.*}", precision, value)
    }
}

/// True when `magnitude` lies exactly halfway between two `precision`-digit
/// decimals. Such a value is `n / 10^(precision + 1)` with `n` ending in 5,
/// and is representable only when `5^(precision + 1)` divides `n`.
fn is_exact_half(magnitude: f64, precision: usize) -> bool {
    let text = format!("{:.*}", precision + 1, magnitude);
    if !text.ends_with('5') || text.parse::<f64>() != Ok(magnitude) {
        return false;
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let five_power = 5u64.pow(precision as u32 + 1);
    digits.parse::<u64>().is_ok_and(|n| n % five_power == 0)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReadingSeries {
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ReadingSeries {
    #[cfg(test)]
    pub fn new(values: Vec<f64>, labels: Vec<&str>) -> Self {
        Self {
            values,
            labels: labels.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Body of `GET /api/graphs/latest`. Missing channels decode as empty series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphsSnapshot {
    #[serde(default)]
    pub temperature: ReadingSeries,
    #[serde(default)]
    pub humidity: ReadingSeries,
    #[serde(default)]
    pub soil: ReadingSeries,
    #[serde(default)]
    pub light: ReadingSeries,
}

impl GraphsSnapshot {
    pub fn series(&self, channel: Channel) -> &ReadingSeries {
        match channel {
            Channel::Temperature => &self.temperature,
            Channel::Humidity => &self.humidity,
            Channel::Soil => &self.soil,
            Channel::Light => &self.light,
        }
    }

    /// Time labels for a channel's chart.
    ///
    /// Channels carry their own labels; a channel that sent none borrows the
    /// temperature labels, which is the shared timeline the backend emits today.
    pub fn chart_labels(&self, channel: Channel) -> &[String] {
        let own = &self.series(channel).labels;
        if own.is_empty() {
            &self.temperature.labels
        } else {
            own
        }
    }
}
