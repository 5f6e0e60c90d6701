//! Core estimation and planning algorithms.
//!
//! # Contents
//!
//! - [`localization`]: Wi-Fi/BLE fingerprint k-NN positioning
//! - [`fusion`]: EKF combining dead reckoning with radio fixes
//! - [`planning`]: A* over the navigation graph

pub mod fusion;
pub mod localization;
pub mod planning;
