//! Device selection and parameters (`[device]` section)

use crate::devices::mock::config::SimulationConfig;
use serde::Deserialize;

/// Which device to run against and how to set it up
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Device kind: `simulated` or `replay`
    #[serde(default = "default_kind", alias = "type")]
    pub kind: String,

    /// Recording to play back (`replay` only)
    #[serde(default)]
    pub replay_path: Option<String>,

    /// Play the recording at wall-clock speed (`replay` only)
    #[serde(default = "default_realtime")]
    pub realtime: bool,

    /// Simulated pedestrian (`simulated` only)
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_kind() -> String {
    "simulated".to_string()
}
fn default_realtime() -> bool {
    true
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            replay_path: None,
            realtime: default_realtime(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Replay the given recording.
    pub fn replay(path: impl Into<String>, realtime: bool) -> Self {
        Self {
            kind: "replay".to_string(),
            replay_path: Some(path.into()),
            realtime,
            ..Self::default()
        }
    }
}
