//! Core abstractions for devices.
//!
//! - [`driver::DeviceDriver`]: Trait to implement for new hardware
//! - [`driver::RadioScanner`]: Blocking radio scan, owned by the scan worker
//! - [`types`]: Keypad input events

pub mod driver;
pub mod types;
