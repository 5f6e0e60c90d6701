//! Extended Kalman Filter fusing PDR steps with radio position fixes.
//!
//! # State Representation
//!
//! - State: `x = [px, py, θ]` in the map frame, θ in (-π, π]
//! - Covariance: 3x3 `P`, kept symmetric with non-negative variances
//!
//! # Prediction (step event)
//!
//! ```text
//! mid = θ + Δθ/2
//! px' = px + L·cos(mid)
//! py' = py + L·sin(mid)
//! θ'  = wrap(θ + Δθ)
//!
//!     ┌ 1  0  −L·sin(mid) ┐
//! F = │ 0  1   L·cos(mid) │      P ← F·P·Fᵀ + Q
//!     └ 0  0   1          ┘
//! ```
//!
//! A window without a step only rotates the heading. The covariance is not
//! grown on these rotation-only ticks.
//!
//! # Update (position fix)
//!
//! `H = [I₂ | 0]`, so only the top-left 2x2 block of `P` enters `S`:
//!
//! ```text
//! y = z − H·x        S = H·P·Hᵀ + R        K = P·Hᵀ·S⁻¹
//! x ← x + K·y        P ← (I − K·H)·P
//! ```
//!
//! A numerically singular `S` or any non-finite intermediate skips the
//! update and keeps the prior.

use crate::core::math::normalize_angle;
use crate::core::types::{Covariance2D, Point2D, Pose2D};
use crate::sensors::StepEvent;
use serde::{Deserialize, Serialize};

/// |det(S)| at or below this is treated as singular.
const SINGULAR_DET: f32 = 1e-9;

/// Process noise added on every step prediction (variances).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessNoise {
    /// Position x variance per step window (m²)
    pub x: f32,
    /// Position y variance per step window (m²)
    pub y: f32,
    /// Heading variance per step window (rad²)
    pub theta: f32,
}

impl Default for ProcessNoise {
    fn default() -> Self {
        Self {
            x: 0.1,
            y: 0.1,
            theta: 0.05,
        }
    }
}

/// Radio fix noise (variances).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementNoise {
    /// Fix x variance (m²)
    pub x: f32,
    /// Fix y variance (m²)
    pub y: f32,
}

impl Default for MeasurementNoise {
    fn default() -> Self {
        // k-NN fixes are only good to a couple of meters
        Self { x: 2.0, y: 2.0 }
    }
}

/// Configuration for [`Ekf`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EkfConfig {
    pub process_noise: ProcessNoise,
    pub measurement_noise: MeasurementNoise,
}

/// Pose fuser. The single owner of the pedestrian pose.
#[derive(Debug, Clone)]
pub struct Ekf {
    config: EkfConfig,
    state: Pose2D,
    covariance: Covariance2D,
    /// A singular-S warning has already been logged
    singular_warned: bool,
    updates_applied: u64,
    updates_skipped: u64,
}

impl Ekf {
    /// Create a filter at the origin with identity covariance.
    pub fn new(config: EkfConfig) -> Self {
        Self {
            config,
            state: Pose2D::identity(),
            covariance: Covariance2D::identity(),
            singular_warned: false,
            updates_applied: 0,
            updates_skipped: 0,
        }
    }

    /// Reset the state to the given pose with identity covariance.
    pub fn initialize(&mut self, px: f32, py: f32, theta: f32) {
        self.initialize_with_covariance(Pose2D::new(px, py, theta), Covariance2D::identity());
    }

    /// Reset the state to an explicit pose and covariance.
    pub fn initialize_with_covariance(&mut self, pose: Pose2D, covariance: Covariance2D) {
        self.state = Pose2D::new(pose.x, pose.y, pose.theta);
        self.covariance = covariance;
        self.covariance.symmetrize();
        log::debug!(
            "[Ekf] Initialized at ({:.2}, {:.2}, {:.3})",
            self.state.x,
            self.state.y,
            self.state.theta
        );
    }

    /// Propagate the state with one drained PDR window.
    pub fn predict(&mut self, step: &StepEvent) {
        if !step.step_length.is_finite() || !step.delta_heading.is_finite() {
            log::warn!("[Ekf] Ignoring non-finite step event: {:?}", step);
            return;
        }

        let theta = self.state.theta;

        if !step.step_detected {
            self.state.theta = normalize_angle(theta + step.delta_heading);
            return;
        }

        let length = step.step_length;
        let mid = theta + 0.5 * step.delta_heading;
        let (sin_m, cos_m) = mid.sin_cos();

        self.state.x += length * cos_m;
        self.state.y += length * sin_m;
        self.state.theta = normalize_angle(theta + step.delta_heading);

        #[rustfmt::skip]
        let f = Covariance2D::from_array([
            1.0, 0.0, -length * sin_m,
            0.0, 1.0,  length * cos_m,
            0.0, 0.0,  1.0,
        ]);
        let q = &self.config.process_noise;
        let q = Covariance2D::diagonal(q.x, q.y, q.theta);

        let mut p = f.matmul(&self.covariance).matmul(&f.transpose()).plus(&q);
        p.symmetrize();
        self.covariance = p;

        log::trace!(
            "[Ekf] Predict L={:.3} dθ={:.3} -> ({:.2}, {:.2}, {:.3})",
            length,
            step.delta_heading,
            self.state.x,
            self.state.y,
            self.state.theta
        );
    }

    /// Correct the position with an absolute fix.
    ///
    /// Returns `false` if the update was skipped (non-finite fix, singular
    /// innovation covariance or a non-finite result).
    pub fn update(&mut self, z: Point2D) -> bool {
        if !z.is_finite() {
            log::warn!("[Ekf] Ignoring non-finite fix ({}, {})", z.x, z.y);
            self.updates_skipped += 1;
            return false;
        }

        let p = *self.covariance.as_slice();
        let r = &self.config.measurement_noise;

        // S = H P Hᵀ + R (2x2)
        let s00 = p[0] + r.x;
        let s01 = p[1];
        let s10 = p[3];
        let s11 = p[4] + r.y;
        let det = s00 * s11 - s01 * s10;

        if !det.is_finite() || det.abs() <= SINGULAR_DET {
            self.skip_singular(det);
            return false;
        }

        let inv_det = 1.0 / det;
        let si00 = s11 * inv_det;
        let si01 = -s01 * inv_det;
        let si10 = -s10 * inv_det;
        let si11 = s00 * inv_det;

        // K = P Hᵀ S⁻¹ (3x2); P Hᵀ is the first two columns of P
        let mut k = [[0.0f32; 2]; 3];
        for (row, k_row) in k.iter_mut().enumerate() {
            let ph0 = p[row * 3];
            let ph1 = p[row * 3 + 1];
            k_row[0] = ph0 * si00 + ph1 * si10;
            k_row[1] = ph0 * si01 + ph1 * si11;
        }

        let y0 = z.x - self.state.x;
        let y1 = z.y - self.state.y;

        let new_x = self.state.x + k[0][0] * y0 + k[0][1] * y1;
        let new_y = self.state.y + k[1][0] * y0 + k[1][1] * y1;
        let new_theta = normalize_angle(self.state.theta + k[2][0] * y0 + k[2][1] * y1);

        // P ← P − K (H P); H P is the first two rows of P
        let mut updated = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                updated[row * 3 + col] =
                    p[row * 3 + col] - (k[row][0] * p[col] + k[row][1] * p[3 + col]);
            }
        }
        let mut new_p = Covariance2D::from_array(updated);
        new_p.symmetrize();

        if !(new_x.is_finite() && new_y.is_finite() && new_theta.is_finite() && new_p.is_finite())
        {
            self.skip_singular(det);
            return false;
        }

        self.state = Pose2D {
            x: new_x,
            y: new_y,
            theta: new_theta,
        };
        self.covariance = new_p;
        self.updates_applied += 1;

        log::debug!(
            "[Ekf] Fix ({:.2}, {:.2}) innovation ({:.2}, {:.2}) -> ({:.2}, {:.2})",
            z.x,
            z.y,
            y0,
            y1,
            new_x,
            new_y
        );
        true
    }

    fn skip_singular(&mut self, det: f32) {
        self.updates_skipped += 1;
        if self.singular_warned {
            log::debug!("[Ekf] Update skipped again (det(S)={:e})", det);
        } else {
            self.singular_warned = true;
            log::warn!(
                "[Ekf] Innovation covariance is singular (det(S)={:e}), keeping prior",
                det
            );
        }
    }

    /// Copy of the current pose.
    #[inline]
    pub fn state(&self) -> Pose2D {
        self.state
    }

    /// Copy of the current covariance.
    #[inline]
    pub fn covariance(&self) -> Covariance2D {
        self.covariance
    }

    pub fn config(&self) -> &EkfConfig {
        &self.config
    }

    /// Number of fixes applied.
    pub fn updates_applied(&self) -> u64 {
        self.updates_applied
    }

    /// Number of fixes rejected.
    pub fn updates_skipped(&self) -> u64 {
        self.updates_skipped
    }
}

impl Default for Ekf {
    fn default() -> Self {
        Self::new(EkfConfig::default())
    }
}
