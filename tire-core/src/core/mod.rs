//! Core foundation layer.
//!
//! This is the bottom layer of the stack with no internal dependencies.
//! All other layers depend on core.
//!
//! # Contents
//!
//! - [`types`]: Core data types (poses, covariance, sensor values, cues)
//! - [`math`]: Angle normalization

pub mod math;
pub mod types;
