//! Beacon field and radio scanner for the simulated device
//!
//! RSSI follows the log-distance path-loss model with Gaussian shadowing:
//!
//! ```text
//! rssi = tx_power - 10 · n · log10(max(d, 0.1)) + N(0, σ²)
//! ```
//!
//! Beacons below the receiver sensitivity, or lost to `dropout`, are absent
//! from the scan.

use super::config::{BeaconConfig, RadioConfig};
use super::noise::NoiseGenerator;
use crate::core::driver::RadioScanner;
use crate::error::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tire_core::core::types::{Point2D, Pose2D, RadioScan};

/// Closest distance used in the path-loss model (meters)
const MIN_DISTANCE: f32 = 0.1;

/// Beacons and propagation model
#[derive(Debug, Clone)]
pub struct BeaconField {
    config: RadioConfig,
}

impl BeaconField {
    pub fn new(config: RadioConfig) -> Self {
        Self { config }
    }

    /// Noise-free RSSI of `beacon` at `position`
    pub fn mean_rssi(beacon: &BeaconConfig, position: &Point2D) -> f32 {
        let distance = position
            .distance(&Point2D::new(beacon.x, beacon.y))
            .max(MIN_DISTANCE);
        beacon.tx_power - 10.0 * beacon.path_loss_exponent * distance.log10()
    }

    /// One noisy scan taken at `position`
    pub fn sample(&self, position: &Point2D, noise: &mut NoiseGenerator) -> RadioScan {
        let mut scan = RadioScan::new();
        for beacon in &self.config.beacons {
            let rssi = Self::mean_rssi(beacon, position) + noise.gaussian(self.config.rssi_stddev);
            if rssi < self.config.sensitivity_dbm || noise.chance(self.config.dropout) {
                continue;
            }
            scan.insert(beacon.id.clone(), rssi);
        }
        scan
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.config.scan_duration_s).unwrap_or(Duration::ZERO)
    }
}

/// Radio scanner reading the walker's true position
///
/// The scan is taken at the position reached when the scan completes. A scan
/// never listens longer than the requested window.
pub struct SimulatedScanner {
    field: BeaconField,
    noise: NoiseGenerator,
    true_pose: Arc<RwLock<Pose2D>>,
}

impl SimulatedScanner {
    pub fn new(field: BeaconField, noise: NoiseGenerator, true_pose: Arc<RwLock<Pose2D>>) -> Self {
        Self {
            field,
            noise,
            true_pose,
        }
    }
}

impl RadioScanner for SimulatedScanner {
    fn scan(&mut self, window: Duration) -> Result<RadioScan> {
        let duration = self.field.scan_duration();
        if duration > window {
            log::debug!(
                "[SimulatedScanner] Scan takes {:?}, cut to the {:?} window",
                duration,
                window
            );
        }
        std::thread::sleep(duration.min(window));

        let position = self.true_pose.read().position();
        let scan = self.field.sample(&position, &mut self.noise);
        log::trace!(
            "[SimulatedScanner] {} beacons at ({:.2}, {:.2})",
            scan.len(),
            position.x,
            position.y
        );
        Ok(scan)
    }
}
