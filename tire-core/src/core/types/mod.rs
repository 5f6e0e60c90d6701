//! Core data types for the navigation stack.
//!
//! - [`Point2D`], [`Pose2D`]: map-frame position and pose
//! - [`Covariance2D`]: 3x3 pose uncertainty
//! - [`InertialSample`], [`RadioScan`], [`BeaconReading`]: raw sensor values
//! - [`AudioCue`]: output decisions

mod covariance;
mod cue;
mod pose;
mod sensor;

pub use covariance::Covariance2D;
pub use cue::AudioCue;
pub use pose::{Point2D, Pose2D};
pub use sensor::{BeaconReading, InertialSample, RadioScan};
