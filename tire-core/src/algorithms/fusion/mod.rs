//! Pose fusion.
//!
//! - [`Ekf`]: dead-reckoning prediction from PDR steps, correction from
//!   radio position fixes

mod ekf;

pub use ekf::{Ekf, EkfConfig, MeasurementNoise, ProcessNoise};
