use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Motor {
    pub rpm: i64,
    pub temperature: f64,
}

/// Telemetry record in the shape the simulated avionics emits.
///
/// Live readings are expected to follow the same layout, but `sample` is
/// optional there and defaults to `false`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Telemetry {
    #[serde(default)]
    pub sample: bool,
    pub timestamp: i64,
    pub thing_name: String,
    pub health: bool,
    pub location: Location,
    pub battery_percent: f64,
    pub motor_a: Motor,
    pub motor_b: Motor,
    pub motor_c: Motor,
    pub motor_d: Motor,
}

/// One tick's telemetry event: either the avionics response passed through
/// as-is, or a record derived from the simulated state.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TelemetryPayload {
    Live(Value),
    Sampled(Telemetry),
}

impl TelemetryPayload {
    pub fn is_sample(&self) -> bool {
        matches!(self, TelemetryPayload::Sampled(_))
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
