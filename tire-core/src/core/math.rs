//! Angle helpers shared by the PDR, the fuser and the announcer.
//!
//! Two canonical ranges are in use:
//! - `(-π, π]` for poses and bearing errors ([`normalize_angle`])
//! - `[0, 2π)` for the integrated PDR heading ([`wrap_two_pi`])

use std::f32::consts::{PI, TAU};

/// Normalize angle to (-π, π].
///
/// # Example
/// ```
/// use tire_core::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Wrap angle into [0, 2π).
#[inline]
pub fn wrap_two_pi(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// Shortest signed rotation taking heading `from` onto heading `to`.
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}
