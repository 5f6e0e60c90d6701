//! Simulated pedestrian configuration
//!
//! Every parameter has a default, and the defaults reproduce the demo
//! hallway: a walk from `RP_HALLWAY_START` (0, 0) north to `RP_HALLWAY_END`
//! (0, 10), three beacons placed so their RSSI roughly matches the demo radio
//! map, and a single "start navigation" key press after one second.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! SimulationConfig
//! ├── start_x/y/theta, random_seed   # Initial state
//! ├── waypoints                      # Scripted walk
//! ├── WalkConfig                     # Gait and turning
//! ├── ImuNoiseConfig                 # Sensor noise
//! ├── RadioConfig                    # Beacons and scan timing
//! │   └── BeaconConfig[]
//! ├── inputs                         # Scripted key presses
//! └── run_duration_s                 # Minimum time powered on
//! ```

use crate::core::types::InputEvent;
use serde::Deserialize;
use std::f32::consts::FRAC_PI_2;

// ============================================================================
// Gait
// ============================================================================

/// Walking pattern of the simulated pedestrian
#[derive(Debug, Clone, Deserialize)]
pub struct WalkConfig {
    /// Steps per second
    #[serde(default = "default_step_frequency_hz")]
    pub step_frequency_hz: f32,

    /// True distance covered per step (meters)
    #[serde(default = "default_step_length")]
    pub step_length: f32,

    /// Peak of the vertical acceleration bump at heel strike (m/s² above g)
    #[serde(default = "default_bump_amplitude")]
    pub bump_amplitude: f32,

    /// Fraction of each step period occupied by the bump
    #[serde(default = "default_bump_duty")]
    pub bump_duty: f32,

    /// Maximum yaw rate while turning (rad/s)
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,

    /// Heading error below which walking resumes after a turn (radians)
    #[serde(default = "default_heading_tolerance")]
    pub heading_tolerance: f32,

    /// Distance at which a waypoint counts as reached (meters)
    #[serde(default = "default_arrival_radius")]
    pub arrival_radius: f32,

    /// Standing still before the first step (seconds)
    #[serde(default = "default_start_delay_s")]
    pub start_delay_s: f32,
}

fn default_step_frequency_hz() -> f32 {
    1.8
}
fn default_step_length() -> f32 {
    0.7
}
fn default_bump_amplitude() -> f32 {
    9.0
}
fn default_bump_duty() -> f32 {
    0.3
}
fn default_turn_rate() -> f32 {
    1.0
}
fn default_heading_tolerance() -> f32 {
    0.05
}
fn default_arrival_radius() -> f32 {
    0.3
}
fn default_start_delay_s() -> f32 {
    2.0
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            step_frequency_hz: default_step_frequency_hz(),
            step_length: default_step_length(),
            bump_amplitude: default_bump_amplitude(),
            bump_duty: default_bump_duty(),
            turn_rate: default_turn_rate(),
            heading_tolerance: default_heading_tolerance(),
            arrival_radius: default_arrival_radius(),
            start_delay_s: default_start_delay_s(),
        }
    }
}

// ============================================================================
// Inertial noise
// ============================================================================

/// Noise added to every inertial sample
#[derive(Debug, Clone, Deserialize)]
pub struct ImuNoiseConfig {
    /// Accelerometer noise per axis (m/s²)
    #[serde(default = "default_accel_stddev")]
    pub accel_stddev: f32,

    /// Gyroscope noise per axis (rad/s)
    #[serde(default = "default_gyro_stddev")]
    pub gyro_stddev: f32,

    /// Constant yaw-rate bias (rad/s)
    #[serde(default)]
    pub gyro_bias_z: f32,
}

fn default_accel_stddev() -> f32 {
    0.05
}
fn default_gyro_stddev() -> f32 {
    0.005
}

impl Default for ImuNoiseConfig {
    fn default() -> Self {
        Self {
            accel_stddev: default_accel_stddev(),
            gyro_stddev: default_gyro_stddev(),
            gyro_bias_z: 0.0,
        }
    }
}

// ============================================================================
// Radio
// ============================================================================

/// A simulated beacon using the log-distance path-loss model
///
/// `rssi(d) = tx_power - 10 · n · log10(d)`
#[derive(Debug, Clone, Deserialize)]
pub struct BeaconConfig {
    pub id: String,
    pub x: f32,
    pub y: f32,

    /// RSSI at 1 m (dBm)
    #[serde(default = "default_tx_power")]
    pub tx_power: f32,

    /// Path-loss exponent `n`
    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f32,
}

fn default_tx_power() -> f32 {
    -50.0
}
fn default_path_loss_exponent() -> f32 {
    3.0
}

impl BeaconConfig {
    pub fn new(id: &str, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            tx_power: default_tx_power(),
            path_loss_exponent: default_path_loss_exponent(),
        }
    }
}

/// Radio scan simulation
#[derive(Debug, Clone, Deserialize)]
pub struct RadioConfig {
    /// Time one scan takes (seconds)
    #[serde(default = "default_scan_duration_s")]
    pub scan_duration_s: f32,

    /// RSSI noise (dB)
    #[serde(default = "default_rssi_stddev")]
    pub rssi_stddev: f32,

    /// Beacons weaker than this are not heard (dBm)
    #[serde(default = "default_sensitivity_dbm")]
    pub sensitivity_dbm: f32,

    /// Probability that a beacon in range is missed by a scan
    #[serde(default)]
    pub dropout: f32,

    #[serde(default = "default_beacons")]
    pub beacons: Vec<BeaconConfig>,
}

fn default_scan_duration_s() -> f32 {
    0.8
}
fn default_rssi_stddev() -> f32 {
    2.0
}
fn default_sensitivity_dbm() -> f32 {
    -100.0
}
fn default_beacons() -> Vec<BeaconConfig> {
    vec![
        BeaconConfig::new("BEACON_ID_1", 0.0, -1.0),
        BeaconConfig::new("BEACON_ID_2", 0.0, 11.0),
        BeaconConfig::new("BEACON_ID_3", 8.0, 16.0),
    ]
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            scan_duration_s: default_scan_duration_s(),
            rssi_stddev: default_rssi_stddev(),
            sensitivity_dbm: default_sensitivity_dbm(),
            dropout: 0.0,
            beacons: default_beacons(),
        }
    }
}

// ============================================================================
// Scripted input
// ============================================================================

/// A key press injected at a fixed time after startup
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedInput {
    /// Seconds after initialization
    pub at_s: f32,
    pub event: InputEvent,
}

// ============================================================================
// Top level
// ============================================================================

/// Simulated device configuration (`[device.simulation]`)
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Initial X position (meters)
    #[serde(default)]
    pub start_x: f32,

    /// Initial Y position (meters)
    #[serde(default)]
    pub start_y: f32,

    /// Initial heading (radians, CCW from +X)
    #[serde(default = "default_start_theta")]
    pub start_theta: f32,

    /// Random seed for reproducible noise (0 = random each run)
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Points walked in order (meters)
    #[serde(default = "default_waypoints")]
    pub waypoints: Vec<[f32; 2]>,

    #[serde(default)]
    pub walk: WalkConfig,

    #[serde(default)]
    pub imu_noise: ImuNoiseConfig,

    #[serde(default)]
    pub radio: RadioConfig,

    #[serde(default = "default_inputs")]
    pub inputs: Vec<ScriptedInput>,

    /// Stay powered on at least this long, even after the walk (seconds)
    #[serde(default = "default_run_duration_s")]
    pub run_duration_s: f32,
}

fn default_start_theta() -> f32 {
    FRAC_PI_2
}
fn default_random_seed() -> u64 {
    42
}
fn default_waypoints() -> Vec<[f32; 2]> {
    vec![[0.0, 10.0]]
}
fn default_inputs() -> Vec<ScriptedInput> {
    vec![ScriptedInput {
        at_s: 1.0,
        event: InputEvent::StartNavigation,
    }]
}
fn default_run_duration_s() -> f32 {
    3.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            start_theta: default_start_theta(),
            random_seed: default_random_seed(),
            waypoints: default_waypoints(),
            walk: WalkConfig::default(),
            imu_noise: ImuNoiseConfig::default(),
            radio: RadioConfig::default(),
            inputs: default_inputs(),
            run_duration_s: default_run_duration_s(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_section_uses_defaults() {
        let config: SimulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.start_theta, FRAC_PI_2);
        assert_eq!(config.waypoints, vec![[0.0, 10.0]]);
        assert_eq!(config.radio.beacons.len(), 3);
        assert_eq!(config.inputs.len(), 1);
        assert_eq!(config.walk.step_length, 0.7);
    }

    #[test]
    fn test_beacon_defaults() {
        let json = r#"{"radio": {"beacons": [{"id": "B", "x": 1.0, "y": 2.0}]}}"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        let beacon = &config.radio.beacons[0];
        assert_eq!(beacon.tx_power, -50.0);
        assert_eq!(beacon.path_loss_exponent, 3.0);
        assert_eq!(config.radio.scan_duration_s, 0.8);
    }

    #[test]
    fn test_scripted_inputs() {
        let json = r#"{"inputs": [
            {"at_s": 0.5, "event": {"key": "keycode_up", "column": 3}},
            {"at_s": 2.0, "event": {"key": "where_am_i"}}
        ]}"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.inputs[0].event, InputEvent::KeycodeUp(3));
        assert_eq!(config.inputs[1].event, InputEvent::WhereAmI);
    }
}
