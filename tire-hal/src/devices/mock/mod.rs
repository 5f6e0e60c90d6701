//! Simulated device for hardware-free runs
//!
//! A scripted pedestrian carries the device along a list of waypoints in
//! real time. The driver derives every sensor from the walker's true pose:
//!
//! | Capability | Simulation Method |
//! |------------|-------------------|
//! | Inertial sensor | Heel-strike bumps and turn yaw rate + Gaussian noise |
//! | Radio scanner | Log-distance path loss from configured beacons |
//! | Keypad | Scripted events at fixed times |
//! | Audio | Logged, last cues kept for inspection |
//! | Power switch | Off once the walk and the script are done |
//!
//! # Configuration
//!
//! ```toml
//! [device]
//! kind = "simulated"
//!
//! [device.simulation]
//! start_x = 0.0
//! start_y = 0.0
//! start_theta = 1.5708
//! random_seed = 42      # 0 = random each run
//! waypoints = [[0.0, 10.0]]
//!
//! [[device.simulation.inputs]]
//! at_s = 1.0
//! event = { key = "start_navigation" }
//! ```
//!
//! # Thread Model
//!
//! ```text
//! ┌─────────────────┐   true pose    ┌──────────────────┐
//! │  control loop   │ ─────────────▶ │   scan worker    │
//! │ (read_inertial) │  Arc<RwLock>   │ (SimulatedScanner)│
//! └─────────────────┘                └──────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Configuration structures for all simulation parameters
//! - [`walker`]: Pedestrian kinematics and gait
//! - [`radio_sim`]: Beacon field and scanner
//! - [`noise`]: Seeded noise generator

pub mod config;
pub mod noise;
pub mod radio_sim;
pub mod walker;

use crate::core::driver::{DeviceDriver, RadioScanner};
use crate::core::types::InputEvent;
use crate::error::{Error, Result};

use config::{ScriptedInput, SimulationConfig};
use noise::NoiseGenerator;
use radio_sim::{BeaconField, SimulatedScanner};
use walker::Walker;

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tire_core::core::types::{AudioCue, InertialSample, Point2D, Pose2D};
use tire_core::sensors::GRAVITY;

/// Longest gap between two reads that is simulated as elapsed time (seconds)
const MAX_TICK_S: f32 = 0.1;

/// Number of played cues kept for inspection
const CUE_HISTORY: usize = 32;

/// Noise stream ids
const IMU_STREAM: u64 = 1;
const RADIO_STREAM: u64 = 2;

/// Scripted pedestrian device
pub struct SimulatedDevice {
    config: SimulationConfig,
    walker: Walker,
    imu_noise: NoiseGenerator,
    true_pose: Arc<RwLock<Pose2D>>,
    scanner: Option<SimulatedScanner>,
    inputs: VecDeque<ScriptedInput>,
    initialized: bool,
    last_read: Option<Instant>,
    /// Simulated seconds since initialization
    sim_time: f32,
    /// Length of the last simulated tick
    last_dt: Option<f32>,
    played: VecDeque<AudioCue>,
}

impl SimulatedDevice {
    pub fn new(config: SimulationConfig) -> Self {
        let start = Pose2D::new(config.start_x, config.start_y, config.start_theta);
        let waypoints = config
            .waypoints
            .iter()
            .map(|&[x, y]| Point2D::new(x, y))
            .collect();
        let walker = Walker::new(config.walk.clone(), start, waypoints);
        let true_pose = Arc::new(RwLock::new(start));

        let scanner = SimulatedScanner::new(
            BeaconField::new(config.radio.clone()),
            NoiseGenerator::derived(config.random_seed, RADIO_STREAM),
            Arc::clone(&true_pose),
        );

        let mut inputs: Vec<ScriptedInput> = config.inputs.clone();
        inputs.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));

        Self {
            imu_noise: NoiseGenerator::derived(config.random_seed, IMU_STREAM),
            walker,
            true_pose,
            scanner: Some(scanner),
            inputs: inputs.into(),
            initialized: false,
            last_read: None,
            sim_time: 0.0,
            last_dt: None,
            played: VecDeque::with_capacity(CUE_HISTORY),
            config,
        }
    }

    /// Advance the simulation by `dt` seconds and sample the inertial sensor.
    pub fn step(&mut self, dt: f32) -> InertialSample {
        let dt = dt.clamp(0.0, MAX_TICK_S);
        self.sim_time += dt;
        self.last_dt = Some(dt);
        let motion = self.walker.advance(dt);
        *self.true_pose.write() = self.walker.pose();

        let noise = &self.config.imu_noise;
        let accel = self
            .imu_noise
            .perturb3([0.0, 0.0, GRAVITY + motion.vertical_accel], noise.accel_stddev);
        let mut gyro = self
            .imu_noise
            .perturb3([0.0, 0.0, motion.yaw_rate], noise.gyro_stddev);
        gyro[2] += noise.gyro_bias_z;

        InertialSample::new(accel, gyro)
    }

    /// True pose of the simulated pedestrian
    pub fn true_pose(&self) -> Pose2D {
        *self.true_pose.read()
    }

    /// Simulated seconds since initialization
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Most recently played cues, oldest first
    pub fn played_cues(&self) -> impl Iterator<Item = &AudioCue> {
        self.played.iter()
    }
}

impl DeviceDriver for SimulatedDevice {
    fn name(&self) -> &str {
        "simulated"
    }

    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "[SimulatedDevice] Start ({:.2}, {:.2}, {:.2}), {} waypoints, {} beacons, {} scripted inputs",
            self.config.start_x,
            self.config.start_y,
            self.config.start_theta,
            self.config.waypoints.len(),
            self.config.radio.beacons.len(),
            self.inputs.len()
        );
        self.initialized = true;
        self.last_read = None;
        Ok(())
    }

    fn read_inertial(&mut self) -> Result<InertialSample> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        let now = Instant::now();
        let dt = self
            .last_read
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_read = Some(now);
        Ok(self.step(dt))
    }

    fn sample_interval(&self) -> Option<f32> {
        self.last_dt
    }

    fn radio_scanner(&mut self) -> Result<Box<dyn RadioScanner>> {
        match self.scanner.take() {
            Some(scanner) => Ok(Box::new(scanner)),
            None => Err(Error::ScannerTaken),
        }
    }

    fn play_cue(&mut self, cue: &AudioCue) -> Result<()> {
        log::info!("[SimulatedDevice] Playing audio cue: '{}'", cue.id());
        if self.played.len() == CUE_HISTORY {
            self.played.pop_front();
        }
        self.played.push_back(cue.clone());
        Ok(())
    }

    fn read_input(&mut self) -> Option<InputEvent> {
        if self.inputs.front()?.at_s > self.sim_time {
            return None;
        }
        let input = self.inputs.pop_front()?;
        log::debug!("[SimulatedDevice] Key press at {:.2}s: {:?}", self.sim_time, input.event);
        Some(input.event)
    }

    fn is_powered_on(&self) -> bool {
        !(self.walker.is_finished()
            && self.inputs.is_empty()
            && self.sim_time >= self.config.run_duration_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::config::WalkConfig;
    use approx::assert_relative_eq;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.imu_noise.accel_stddev = 0.0;
        config.imu_noise.gyro_stddev = 0.0;
        config.radio.scan_duration_s = 0.0;
        config
    }

    #[test]
    fn test_requires_initialize() {
        let mut device = SimulatedDevice::new(quiet_config());
        assert!(matches!(device.read_inertial(), Err(Error::NotInitialized)));
        device.initialize().unwrap();
        assert!(device.read_inertial().is_ok());
    }

    #[test]
    fn test_standing_reads_gravity() {
        let mut device = SimulatedDevice::new(quiet_config());
        let sample = device.step(0.02);
        assert_relative_eq!(device.sample_interval().unwrap(), 0.02);
        assert_relative_eq!(sample.accel_magnitude(), GRAVITY);
        assert_eq!(sample.yaw_rate(), 0.0);
    }

    #[test]
    fn test_walk_moves_true_pose() {
        let mut device = SimulatedDevice::new(quiet_config());
        // 2 s start delay + 2 s walking
        for _ in 0..200 {
            device.step(0.02);
        }
        let pose = device.true_pose();
        assert!(pose.y > 2.0 && pose.y < 3.0, "y = {}", pose.y);
        assert_relative_eq!(device.sim_time(), 4.0, epsilon = 1e-3);
    }

    #[test]
    fn test_scanner_taken_once() {
        let mut device = SimulatedDevice::new(quiet_config());
        assert!(device.radio_scanner().is_ok());
        assert!(matches!(device.radio_scanner(), Err(Error::ScannerTaken)));
    }

    #[test]
    fn test_scripted_inputs_follow_sim_time() {
        let mut config = quiet_config();
        config.inputs = vec![
            ScriptedInput {
                at_s: 0.5,
                event: InputEvent::WhereAmI,
            },
            ScriptedInput {
                at_s: 0.1,
                event: InputEvent::KeycodeUp(0),
            },
        ];
        let mut device = SimulatedDevice::new(config);

        assert_eq!(device.read_input(), None);
        device.step(0.1);
        assert_eq!(device.read_input(), Some(InputEvent::KeycodeUp(0)));
        assert_eq!(device.read_input(), None);
        for _ in 0..5 {
            device.step(0.1);
        }
        assert_eq!(device.read_input(), Some(InputEvent::WhereAmI));
        assert_eq!(device.read_input(), None);
    }

    #[test]
    fn test_powers_off_after_script() {
        let mut config = quiet_config();
        config.waypoints = vec![[0.0, 1.0]];
        config.walk = WalkConfig {
            start_delay_s: 0.0,
            ..WalkConfig::default()
        };
        config.inputs.clear();
        config.run_duration_s = 2.0;
        let mut device = SimulatedDevice::new(config);

        assert!(device.is_powered_on());
        // Walk of 0.7 m takes well under 2 s; stays on until run_duration_s
        for _ in 0..90 {
            device.step(0.02);
        }
        assert!(device.is_powered_on());
        for _ in 0..20 {
            device.step(0.02);
        }
        assert!(!device.is_powered_on());
    }

    #[test]
    fn test_cue_history() {
        let mut device = SimulatedDevice::new(quiet_config());
        for _ in 0..40 {
            device.play_cue(&AudioCue::Checkpoint).unwrap();
        }
        device.play_cue(&AudioCue::DestinationReached).unwrap();
        assert_eq!(device.played_cues().count(), CUE_HISTORY);
        assert_eq!(device.played_cues().last(), Some(&AudioCue::DestinationReached));
    }
}
