//! Sensor processing layer.
//!
//! Turns raw inertial samples into discrete motion events.
//!
//! # Contents
//!
//! - [`pdr`]: Step detection, Weinberg step length, heading integration

pub mod pdr;

pub use pdr::{GRAVITY, PdrConfig, PdrProcessor, StepEvent};
