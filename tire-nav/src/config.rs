//! Configuration loading for tire-nav
//!
//! Every section is optional; a missing file or section falls back to the
//! defaults, which run the simulated hallway walk against the built-in demo
//! map.

use crate::error::{NavError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;
use std::path::Path;
use std::time::Duration;
use tire_core::io::map_loader::HALLWAY_END;
use tire_core::{EkfConfig, GuidanceConfig, LocalizerConfig, PdrConfig, Pose2D};
use tire_hal::DeviceConfig;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub pdr: PdrConfig,
    #[serde(default)]
    pub ekf: EkfConfig,
    #[serde(default)]
    pub localizer: LocalizerConfig,
    #[serde(default)]
    pub guidance: GuidanceConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

/// Map files. Without them the built-in demo hallway is used.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapConfig {
    /// Navigation graph JSON
    #[serde(default)]
    pub graph_path: Option<String>,

    /// Radio map JSON
    #[serde(default)]
    pub radio_map_path: Option<String>,
}

/// Radio scan scheduling
#[derive(Clone, Debug, Deserialize)]
pub struct ScanConfig {
    /// Time between periodic scans (seconds, default: 5.0)
    #[serde(default = "default_scan_interval")]
    pub interval_s: f32,

    /// Listening window handed to the scanner (seconds, default: 1.0)
    #[serde(default = "default_scan_window")]
    pub window_s: f32,

    /// Overrun past the window before a scan is discarded (seconds, default: 0.5)
    #[serde(default = "default_scan_grace")]
    pub grace_s: f32,
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        seconds(self.interval_s)
    }

    pub fn window(&self) -> Duration {
        seconds(self.window_s)
    }

    /// Longest scan whose result is still applied
    pub fn max_age(&self) -> Duration {
        seconds(self.window_s + self.grace_s)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_s: default_scan_interval(),
            window_s: default_scan_window(),
            grace_s: default_scan_grace(),
        }
    }
}

/// Control loop settings
#[derive(Clone, Debug, Deserialize)]
pub struct ControlConfig {
    /// Loop rate (Hz, default: 50)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f32,

    /// Starting pose `[x, y, theta]` (default: origin facing +y)
    #[serde(default = "default_initial_pose")]
    pub initial_pose: [f32; 3],

    /// Seconds between status lines on the console (0 disables)
    #[serde(default = "default_status_interval")]
    pub status_interval_s: f32,
}

impl ControlConfig {
    pub fn period(&self) -> Duration {
        seconds(1.0 / self.rate_hz.max(1.0))
    }

    pub fn initial_pose(&self) -> Pose2D {
        let [x, y, theta] = self.initial_pose;
        Pose2D::new(x, y, theta)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            initial_pose: default_initial_pose(),
            status_interval_s: default_status_interval(),
        }
    }
}

/// Destination selection
#[derive(Clone, Debug, Deserialize)]
pub struct NavigationConfig {
    /// Destination when the keypad code is not listed
    #[serde(default = "default_destination")]
    pub default_destination: Option<String>,

    /// Keypad code (four digits, e.g. "0042") → node id
    #[serde(default)]
    pub destinations: BTreeMap<String, String>,
}

impl NavigationConfig {
    /// Node id selected by a keypad code.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.destinations
            .get(code)
            .or(self.default_destination.as_ref())
            .map(String::as_str)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_destination: default_destination(),
            destinations: BTreeMap::new(),
        }
    }
}

// Default value functions
fn default_scan_interval() -> f32 {
    5.0
}
fn default_scan_window() -> f32 {
    1.0
}
fn default_scan_grace() -> f32 {
    0.5
}
fn default_rate_hz() -> f32 {
    50.0
}
fn default_initial_pose() -> [f32; 3] {
    [0.0, 0.0, FRAC_PI_2]
}
fn default_status_interval() -> f32 {
    2.0
}
fn default_destination() -> Option<String> {
    Some(HALLWAY_END.to_string())
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
