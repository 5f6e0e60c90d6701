//! Pedestrian dead reckoning: step detection and heading integration.
//!
//! The processor is fed inertial samples at the sensor rate and drained at
//! the control rate. Each drain hands over everything accumulated since the
//! previous one and clears it, so a step is delivered to the fuser exactly once.
//!
//! # Step detection
//!
//! ```text
//! |a| ──► IIR low-pass ──► rising crossing of threshold ──► pending
//!                          first falling sample       ──► confirmed
//! ```
//!
//! The filtered magnitude starts at gravity. A confirmed step is accepted
//! only if `min_step_interval_s` has passed since the previous accepted step.
//!
//! # Step length (Weinberg)
//!
//! ```text
//! L = K · (peak − g)^¼    clamped to [min_step_length, max_step_length]
//! ```
//!
//! where `peak` is the highest filtered magnitude seen while the step was
//! pending. A peak below gravity is replaced by `g + 0.1`.

use crate::core::math::wrap_two_pi;
use crate::core::types::InertialSample;
use serde::{Deserialize, Serialize};

/// Standard gravity (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Offset added to gravity when the measured peak sits below it.
const PEAK_FLOOR_OFFSET: f32 = 0.1;

/// Configuration for [`PdrProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdrConfig {
    /// Rest baseline for the acceleration magnitude (m/s²)
    pub gravity: f32,

    /// Weight of the new sample in the low-pass filter (0..1).
    ///
    /// `filtered = (1 - α) · filtered + α · |a|`
    pub smoothing_factor: f32,

    /// Step threshold as a multiple of `gravity`
    pub threshold_ratio: f32,

    /// Weinberg constant K
    pub weinberg_k: f32,

    /// Shortest step length reported (m)
    pub min_step_length: f32,

    /// Longest step length reported (m)
    pub max_step_length: f32,

    /// Minimum time between accepted steps (s). Zero disables the debounce.
    pub min_step_interval_s: f32,
}

impl Default for PdrConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            smoothing_factor: 0.2,
            threshold_ratio: 1.1,
            weinberg_k: 0.45,
            min_step_length: 0.3,
            max_step_length: 1.0,
            // Fastest walking cadence is under 3 steps/s
            min_step_interval_s: 0.35,
        }
    }
}

impl PdrConfig {
    /// Absolute step threshold (m/s²).
    #[inline]
    pub fn step_threshold(&self) -> f32 {
        self.threshold_ratio * self.gravity
    }
}

/// Motion accumulated between two drains.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StepEvent {
    /// Total length of the steps in this window (m)
    pub step_length: f32,
    /// Heading change over the window (rad, unwrapped)
    pub delta_heading: f32,
    /// At least one step was accepted in this window
    pub step_detected: bool,
    /// Number of steps accepted in this window
    pub step_count: u32,
}

impl StepEvent {
    /// A window with one step of the given length and heading change.
    pub fn step(step_length: f32, delta_heading: f32) -> Self {
        Self {
            step_length,
            delta_heading,
            step_detected: true,
            step_count: 1,
        }
    }

    /// A window with rotation only.
    pub fn rotation(delta_heading: f32) -> Self {
        Self {
            delta_heading,
            ..Default::default()
        }
    }
}

/// Step detector and heading integrator.
#[derive(Debug, Clone)]
pub struct PdrProcessor {
    config: PdrConfig,

    /// Low-pass filtered acceleration magnitude
    filtered: f32,
    /// Rising crossing seen, waiting for the falling edge
    step_pending: bool,
    /// Highest filtered magnitude while pending
    pending_peak: f32,
    /// Seconds since the last accepted step (None until the first step)
    since_last_step: Option<f32>,

    /// Absolute heading in [0, 2π)
    heading: f32,

    // Accumulators cleared by drain()
    acc_length: f32,
    acc_heading: f32,
    acc_steps: u32,

    total_steps: u64,
    rejected_samples: u64,
}

impl PdrProcessor {
    pub fn new(config: PdrConfig) -> Self {
        Self {
            filtered: config.gravity,
            step_pending: false,
            pending_peak: config.gravity,
            since_last_step: None,
            heading: 0.0,
            acc_length: 0.0,
            acc_heading: 0.0,
            acc_steps: 0,
            total_steps: 0,
            rejected_samples: 0,
            config,
        }
    }

    /// Feed one inertial sample taken `dt` seconds after the previous one.
    ///
    /// Returns `false` when the sample is rejected (non-finite values or a
    /// negative `dt`). A rejected sample leaves all state untouched.
    pub fn ingest(&mut self, sample: &InertialSample, dt: f32) -> bool {
        if !sample.is_finite() || !dt.is_finite() || dt < 0.0 {
            self.rejected_samples += 1;
            log::debug!("[Pdr] Rejected sample (dt={}): {:?}", dt, sample);
            return false;
        }

        let yaw_delta = sample.yaw_rate() * dt;
        self.heading = wrap_two_pi(self.heading + yaw_delta);
        self.acc_heading += yaw_delta;

        if let Some(elapsed) = self.since_last_step.as_mut() {
            *elapsed += dt;
        }

        let magnitude = sample.accel_magnitude();
        let alpha = self.config.smoothing_factor;
        let previous = self.filtered;
        self.filtered = (1.0 - alpha) * previous + alpha * magnitude;

        log::trace!(
            "[Pdr] |a|={:.3} filtered={:.3} heading={:.3}",
            magnitude,
            self.filtered,
            self.heading
        );

        let threshold = self.config.step_threshold();
        if self.step_pending {
            if self.filtered < previous {
                self.step_pending = false;
                self.confirm_step(self.pending_peak);
            } else {
                self.pending_peak = self.pending_peak.max(self.filtered);
            }
        } else if previous <= threshold && self.filtered > threshold {
            self.step_pending = true;
            self.pending_peak = self.filtered;
        }

        true
    }

    /// Hand over the accumulated motion and reset the accumulators.
    pub fn drain(&mut self) -> StepEvent {
        let event = StepEvent {
            step_length: self.acc_length,
            delta_heading: self.acc_heading,
            step_detected: self.acc_steps > 0,
            step_count: self.acc_steps,
        };
        self.acc_length = 0.0;
        self.acc_heading = 0.0;
        self.acc_steps = 0;
        event
    }

    /// Weinberg step length for a given peak magnitude.
    pub fn step_length(&self, peak: f32) -> f32 {
        let g = self.config.gravity;
        let peak = if peak < g { g + PEAK_FLOOR_OFFSET } else { peak };
        let length = self.config.weinberg_k * (peak - g).powf(0.25);
        length.clamp(self.config.min_step_length, self.config.max_step_length)
    }

    fn confirm_step(&mut self, peak: f32) {
        if let Some(elapsed) = self.since_last_step
            && elapsed < self.config.min_step_interval_s
        {
            log::debug!(
                "[Pdr] Step ignored: {:.3}s since previous (min {:.3}s)",
                elapsed,
                self.config.min_step_interval_s
            );
            return;
        }

        let length = self.step_length(peak);
        self.acc_length += length;
        self.acc_steps += 1;
        self.total_steps += 1;
        self.since_last_step = Some(0.0);

        log::debug!(
            "[Pdr] Step #{}: peak={:.3} length={:.3}m",
            self.total_steps,
            peak,
            length
        );
    }

    /// Absolute integrated heading in [0, 2π).
    #[inline]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Current low-pass filtered acceleration magnitude.
    #[inline]
    pub fn filtered_magnitude(&self) -> f32 {
        self.filtered
    }

    /// Steps accepted since construction or the last reset.
    #[inline]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Samples rejected since construction or the last reset.
    #[inline]
    pub fn rejected_samples(&self) -> u64 {
        self.rejected_samples
    }

    pub fn config(&self) -> &PdrConfig {
        &self.config
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

impl Default for PdrProcessor {
    fn default() -> Self {
        Self::new(PdrConfig::default())
    }
}
