//! Device implementations
//!
//! - [`mock`]: Scripted pedestrian, no hardware needed
//! - [`replay`]: Playback of recorded sessions

pub mod mock;
pub mod replay;

use crate::config::DeviceConfig;
use crate::core::driver::DeviceDriver;
use crate::error::{Error, Result};
use mock::SimulatedDevice;
use replay::ReplayDevice;
use std::path::Path;

/// Create a device driver based on configuration
pub fn create_device(config: &DeviceConfig) -> Result<Box<dyn DeviceDriver>> {
    match config.kind.as_str() {
        "simulated" | "mock" => Ok(Box::new(SimulatedDevice::new(config.simulation.clone()))),
        "replay" => {
            let path = config.replay_path.as_deref().ok_or_else(|| {
                Error::InvalidParameter("replay device requires replay_path".to_string())
            })?;
            let driver = ReplayDevice::open(Path::new(path), config.realtime)?;
            Ok(Box::new(driver))
        }
        _ => Err(Error::UnknownDevice(config.kind.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_simulated() {
        let device = create_device(&DeviceConfig::default()).unwrap();
        assert_eq!(device.name(), "simulated");
        assert!(device.is_powered_on());
    }

    #[test]
    fn test_replay_requires_path() {
        let config = DeviceConfig {
            kind: "replay".to_string(),
            ..DeviceConfig::default()
        };
        assert!(matches!(create_device(&config), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_unknown_kind() {
        let config = DeviceConfig {
            kind: "crl200s".to_string(),
            ..DeviceConfig::default()
        };
        assert!(matches!(create_device(&config), Err(Error::UnknownDevice(kind)) if kind == "crl200s"));
    }
}
