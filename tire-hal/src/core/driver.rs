//! DeviceDriver trait definition

use crate::core::types::InputEvent;
use crate::error::Result;
use std::time::Duration;
use tire_core::core::types::{AudioCue, InertialSample, RadioScan};

/// Device driver trait for hardware abstraction
///
/// The control loop owns the driver and calls it from one thread. The radio
/// scanner is split off once at startup and moved to the scan worker.
pub trait DeviceDriver: Send {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Bring the hardware up. Called once before any other method.
    fn initialize(&mut self) -> Result<()>;

    /// Latest inertial sample (accel in m/s², gyro in rad/s, device frame)
    fn read_inertial(&mut self) -> Result<InertialSample>;

    /// Seconds between the last two inertial samples on the device clock.
    ///
    /// `None` when the device has no clock of its own; the caller then
    /// measures the interval on the wall clock.
    fn sample_interval(&self) -> Option<f32> {
        None
    }

    /// Hand out the radio scanner. Fails with `ScannerTaken` on a second call.
    fn radio_scanner(&mut self) -> Result<Box<dyn RadioScanner>>;

    /// Play an audio cue. Non-blocking.
    fn play_cue(&mut self, cue: &AudioCue) -> Result<()>;

    /// Next pending key press, non-blocking
    fn read_input(&mut self) -> Option<InputEvent>;

    /// False once the power switch is off (or the scenario ended)
    fn is_powered_on(&self) -> bool;
}

/// Blocking radio scanner.
pub trait RadioScanner: Send {
    /// Listen for beacons for up to `window` and return what was heard.
    fn scan(&mut self, window: Duration) -> Result<RadioScan>;
}
