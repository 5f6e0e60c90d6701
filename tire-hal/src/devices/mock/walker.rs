//! Pedestrian kinematics for the simulated device
//!
//! The walker follows its waypoint list with a turn-then-walk policy:
//!
//! ```text
//! |heading error| > tolerance  →  turn in place at ≤ turn_rate
//! otherwise                    →  walk at step_length · step_frequency,
//!                                 steering out the residual error
//! ```
//!
//! While walking, each step period starts with a half-sine vertical
//! acceleration bump (`bump_duty` of the period), which is what a
//! body-worn accelerometer sees at heel strike.

use super::config::WalkConfig;
use std::collections::VecDeque;
use std::f32::consts::PI;
use tire_core::core::math::normalize_angle;
use tire_core::core::types::{Point2D, Pose2D};

/// Noise-free body motion over one simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyMotion {
    /// Vertical acceleration on top of gravity (m/s²)
    pub vertical_accel: f32,
    /// Yaw rate (rad/s, CCW positive)
    pub yaw_rate: f32,
}

/// Scripted pedestrian
pub struct Walker {
    config: WalkConfig,
    pose: Pose2D,
    waypoints: VecDeque<Point2D>,
    elapsed: f32,
    /// Position within the current step period, [0, 1)
    phase: f32,
    steps_taken: u32,
}

impl Walker {
    pub fn new(config: WalkConfig, start: Pose2D, waypoints: Vec<Point2D>) -> Self {
        Self {
            config,
            pose: start,
            waypoints: waypoints.into(),
            elapsed: 0.0,
            phase: 0.0,
            steps_taken: 0,
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> BodyMotion {
        if dt <= 0.0 || !dt.is_finite() {
            return BodyMotion::default();
        }
        self.elapsed += dt;
        if self.elapsed < self.config.start_delay_s {
            return BodyMotion::default();
        }
        let Some(&target) = self.waypoints.front() else {
            self.phase = 0.0;
            return BodyMotion::default();
        };

        let position = self.pose.position();
        let error = normalize_angle(position.bearing_to(&target) - self.pose.theta);
        let max_rate = self.config.turn_rate;
        let yaw_rate = (error / dt).clamp(-max_rate, max_rate);
        self.pose.theta = normalize_angle(self.pose.theta + yaw_rate * dt);

        if error.abs() > self.config.heading_tolerance {
            // Turning in place
            self.phase = 0.0;
            return BodyMotion {
                vertical_accel: 0.0,
                yaw_rate,
            };
        }

        let speed = self.config.step_length * self.config.step_frequency_hz;
        let remaining = position.distance(&target);
        let advance = (speed * dt).min(remaining);
        let (sin_t, cos_t) = self.pose.theta.sin_cos();
        self.pose.x += advance * cos_t;
        self.pose.y += advance * sin_t;

        self.phase += dt * self.config.step_frequency_hz;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            self.steps_taken += 1;
        }
        let duty = self.config.bump_duty.clamp(0.05, 1.0);
        let vertical_accel = if self.phase < duty {
            self.config.bump_amplitude * (PI * self.phase / duty).sin()
        } else {
            0.0
        };

        if self.pose.position().distance(&target) <= self.config.arrival_radius {
            log::debug!(
                "[Walker] Reached waypoint ({:.1}, {:.1}) after {:.1}s",
                target.x,
                target.y,
                self.elapsed
            );
            self.waypoints.pop_front();
        }

        BodyMotion {
            vertical_accel,
            yaw_rate,
        }
    }

    /// True pose of the pedestrian
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// All waypoints reached
    pub fn is_finished(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Complete step periods walked so far
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
