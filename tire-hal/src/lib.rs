//! TIRE HAL - device capabilities for the navigation aid
//!
//! The control loop talks to the outside world only through
//! [`DeviceDriver`]: an inertial sensor, a radio scanner, a keypad, an audio
//! output and a power switch. Variants are picked at startup with
//! [`create_device`].
//!
//! ## Devices
//!
//! - `simulated`: scripted pedestrian walking a waypoint list
//! - `replay`: JSON-lines recording played back against the clock

pub mod config;
pub mod core;
pub mod devices;
pub mod error;

// Re-export commonly used types
pub use config::DeviceConfig;
pub use core::driver::{DeviceDriver, RadioScanner};
pub use core::types::{InputEvent, KEYCODE_COLUMNS};
pub use devices::create_device;
pub use error::{Error, Result};
