//! Audio cues produced by the navigation stack.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete audio decision handed to the output device.
///
/// Each cue maps onto a stable id ([`AudioCue::id`]) which devices use to
/// pick a sound file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", content = "name", rename_all = "snake_case")]
pub enum AudioCue {
    /// Target is to the left of the current heading
    TurnLeft,
    /// Target is to the right of the current heading
    TurnRight,
    /// Generic waypoint-reached beep
    Checkpoint,
    /// Waypoint reached, with the node's own announcement
    Landmark(String),
    /// Final route node reached
    DestinationReached,
    /// A route was accepted
    NavigationStarted,
    /// No route exists to the requested destination
    NoPath,
    /// A radio fix was applied on request
    LocationUpdate,
    /// Keypad selection feedback (destination name)
    Selection(String),
}

impl AudioCue {
    /// Stable identifier used by output devices.
    pub fn id(&self) -> &str {
        match self {
            AudioCue::TurnLeft => "turn_left",
            AudioCue::TurnRight => "turn_right",
            AudioCue::Checkpoint => "beep_checkpoint",
            AudioCue::Landmark(name) => name,
            AudioCue::DestinationReached => "destination_reached",
            AudioCue::NavigationStarted => "navigation_started",
            AudioCue::NoPath => "error_no_path",
            AudioCue::LocationUpdate => "location_update",
            AudioCue::Selection(name) => name,
        }
    }

    /// Build the cue for a reached waypoint: its own announcement if it has
    /// one, otherwise the generic checkpoint beep.
    pub fn for_waypoint(audio_cue: &str) -> Self {
        if audio_cue.is_empty() {
            AudioCue::Checkpoint
        } else {
            AudioCue::Landmark(audio_cue.to_string())
        }
    }

    /// Turn cues are rate limited; everything else is event driven.
    pub fn is_turn(&self) -> bool {
        matches!(self, AudioCue::TurnLeft | AudioCue::TurnRight)
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_ids() {
        assert_eq!(AudioCue::TurnLeft.id(), "turn_left");
        assert_eq!(AudioCue::TurnRight.id(), "turn_right");
        assert_eq!(AudioCue::Checkpoint.id(), "beep_checkpoint");
        assert_eq!(AudioCue::DestinationReached.id(), "destination_reached");
        assert_eq!(AudioCue::NoPath.id(), "error_no_path");
        assert_eq!(AudioCue::Landmark("cafe.wav".into()).to_string(), "cafe.wav");
    }

    #[test]
    fn test_for_waypoint() {
        assert_eq!(AudioCue::for_waypoint(""), AudioCue::Checkpoint);
        assert_eq!(
            AudioCue::for_waypoint("hallway_middle"),
            AudioCue::Landmark("hallway_middle".into())
        );
    }
}
