//! Guidance state machine turning the fused pose into audio cues.
//!
//! ```text
//!            accept_route(non-empty)
//!  NoRoute ───────────────────────────▶ Navigating ──(route exhausted)──▶ Arrived
//!     ▲                                    │                                │
//!     └──────── accept_route(empty) ◀──────┴────────────────────────────────┘
//! ```
//!
//! Each [`Announcer::update`] yields at most one cue:
//!
//! 1. Route exhausted: `DestinationReached`, once, and the state becomes
//!    `Arrived`.
//! 2. Waypoint inside the arrival radius: its landmark (or a checkpoint
//!    beep), advance to the next node.
//! 3. Otherwise, once the turn cooldown has elapsed, a turn cue when the
//!    bearing error exceeds the threshold.
//!
//! Arrival therefore takes two updates: the one that reaches the final node
//! plays its landmark, and the next one plays `DestinationReached`.
//!
//! Reaching a waypoint clears the cooldown so the first turn toward the next
//! node is not delayed.

use crate::core::math::normalize_angle;
use crate::core::types::{AudioCue, Pose2D};
use crate::navigation::{NavigationGraph, Route};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Guidance tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// A waypoint counts as reached strictly inside this distance (m)
    pub waypoint_radius: f32,

    /// Minimum time between two turn cues (s)
    pub cooldown_s: f32,

    /// Bearing error above which a turn is announced (rad)
    pub turn_threshold: f32,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            waypoint_radius: 1.5,
            cooldown_s: 3.0,
            turn_threshold: 0.35,
        }
    }
}

/// Guidance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GuidanceState {
    /// No route accepted.
    #[default]
    NoRoute,

    /// Steering toward the next waypoint.
    Navigating,

    /// Destination reached and announced.
    Arrived,
}

impl GuidanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceState::NoRoute => "NO_ROUTE",
            GuidanceState::Navigating => "NAVIGATING",
            GuidanceState::Arrived => "ARRIVED",
        }
    }
}

/// The route being followed and the progress along it.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSession {
    pub route: Route,
    /// Index of the node currently steered toward. Node 0 is the start and
    /// is never announced.
    pub next_index: usize,
    pub destination_reached: bool,
}

impl NavigationSession {
    fn new(route: Route) -> Self {
        Self {
            route,
            next_index: 1,
            destination_reached: false,
        }
    }

    /// Id of the node currently steered toward.
    pub fn next_target(&self) -> Option<&str> {
        self.route.get(self.next_index)
    }
}

/// Turns pose updates into at most one cue per cycle.
#[derive(Debug)]
pub struct Announcer {
    config: GuidanceConfig,
    state: GuidanceState,
    session: Option<NavigationSession>,
    /// Time of the last turn cue; `None` means a turn may be announced now
    last_turn_cue: Option<Instant>,
}

impl Announcer {
    pub fn new(config: GuidanceConfig) -> Self {
        Self {
            config,
            state: GuidanceState::NoRoute,
            session: None,
            last_turn_cue: None,
        }
    }

    /// Replace the current session with `route`.
    ///
    /// An empty route drops any session and returns to `NoRoute`.
    pub fn accept_route(&mut self, route: Route) {
        self.last_turn_cue = None;
        if route.is_empty() {
            debug!("[Announcer] Empty route, guidance idle");
            self.session = None;
            self.state = GuidanceState::NoRoute;
            return;
        }
        info!("[Announcer] Following {}", route);
        self.session = Some(NavigationSession::new(route));
        self.state = GuidanceState::Navigating;
    }

    /// Advance guidance for the current pose.
    pub fn update(
        &mut self,
        pose: &Pose2D,
        graph: &NavigationGraph,
        now: Instant,
    ) -> Option<AudioCue> {
        if self.state != GuidanceState::Navigating {
            return None;
        }
        let session = self.session.as_mut()?;

        let Some(target_id) = session.route.get(session.next_index) else {
            session.destination_reached = true;
            self.state = GuidanceState::Arrived;
            info!("[Announcer] Destination reached");
            return Some(AudioCue::DestinationReached);
        };

        let Some(target) = graph.get_node(target_id) else {
            warn!("[Announcer] Route node '{}' not in graph", target_id);
            return None;
        };

        let position = pose.position();
        let distance = position.distance(&target.position);
        if distance < self.config.waypoint_radius {
            debug!(
                "[Announcer] Reached {} ({}/{}) at {:.2}m",
                target.id,
                session.next_index,
                session.route.len() - 1,
                distance
            );
            session.next_index += 1;
            self.last_turn_cue = None;
            return Some(AudioCue::for_waypoint(&target.audio_cue));
        }

        if let Some(last) = self.last_turn_cue
            && now.saturating_duration_since(last).as_secs_f32() < self.config.cooldown_s
        {
            return None;
        }

        let error = normalize_angle(position.bearing_to(&target.position) - pose.theta);
        let cue = if error > self.config.turn_threshold {
            AudioCue::TurnLeft
        } else if error < -self.config.turn_threshold {
            AudioCue::TurnRight
        } else {
            return None;
        };

        debug!(
            "[Announcer] {} toward {} (error {:.2} rad, {:.1}m)",
            cue, target.id, error, distance
        );
        self.last_turn_cue = Some(now);
        Some(cue)
    }

    pub fn state(&self) -> GuidanceState {
        self.state
    }

    pub fn session(&self) -> Option<&NavigationSession> {
        self.session.as_ref()
    }

    /// Id of the node currently steered toward, while navigating.
    pub fn next_target(&self) -> Option<&str> {
        match self.state {
            GuidanceState::Navigating => self.session.as_ref()?.next_target(),
            _ => None,
        }
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new(GuidanceConfig::default())
    }
}
