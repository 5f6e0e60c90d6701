//! State shared between the control thread and the main thread.
//!
//! The control loop is the only writer. It replaces the whole snapshot once
//! per cycle; readers always get a consistent copy.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tire_core::{Covariance2D, GuidanceState, Pose2D};

/// Fused navigation state at the end of one control cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSnapshot {
    pub pose: Pose2D,
    pub covariance: Covariance2D,
    /// Steps accepted by the PDR since startup
    pub total_steps: u64,
    /// Radio fixes applied since startup
    pub fixes_applied: u64,
    pub guidance: GuidanceState,
    /// Waypoint the guidance is steering toward
    pub next_target: Option<String>,
}

impl PoseSnapshot {
    pub fn new(pose: Pose2D) -> Self {
        Self {
            pose,
            covariance: Covariance2D::identity(),
            total_steps: 0,
            fixes_applied: 0,
            guidance: GuidanceState::NoRoute,
            next_target: None,
        }
    }

    /// 1σ position uncertainty (meters), the larger of the two axes
    pub fn position_sigma(&self) -> f32 {
        self.covariance.var_x().max(self.covariance.var_y()).sqrt()
    }
}

/// Latest snapshot plus the shutdown signal.
#[derive(Debug)]
pub struct SharedPose {
    snapshot: RwLock<PoseSnapshot>,
    /// Set by the control loop when it exits
    finished: AtomicBool,
}

impl SharedPose {
    pub fn new(initial_pose: Pose2D) -> Self {
        Self {
            snapshot: RwLock::new(PoseSnapshot::new(initial_pose)),
            finished: AtomicBool::new(false),
        }
    }

    /// Replace the snapshot.
    pub fn publish(&self, snapshot: PoseSnapshot) {
        *self.snapshot.write() = snapshot;
    }

    /// Copy of the latest snapshot.
    pub fn snapshot(&self) -> PoseSnapshot {
        self.snapshot.read().clone()
    }

    pub fn pose(&self) -> Pose2D {
        self.snapshot.read().pose
    }

    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}
