//! Raw sensor values consumed by the core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One inertial measurement.
///
/// Accelerations in m/s² (gravity included), angular rates in rad/s.
/// Z is the vertical axis; `gyro[2]` is the yaw rate, counter-clockwise positive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InertialSample {
    /// Linear acceleration [x, y, z] in m/s²
    pub accel: [f32; 3],
    /// Angular velocity [x, y, z] in rad/s
    pub gyro: [f32; 3],
}

impl InertialSample {
    /// Create a new sample.
    pub fn new(accel: [f32; 3], gyro: [f32; 3]) -> Self {
        Self { accel, gyro }
    }

    /// Magnitude of the acceleration vector.
    #[inline]
    pub fn accel_magnitude(&self) -> f32 {
        let [x, y, z] = self.accel;
        (x * x + y * y + z * z).sqrt()
    }

    /// Yaw rate (rad/s).
    #[inline]
    pub fn yaw_rate(&self) -> f32 {
        self.gyro[2]
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.accel.iter().chain(self.gyro.iter()).all(|v| v.is_finite())
    }
}

/// A single beacon observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconReading {
    /// Beacon identifier (MAC address or name)
    pub beacon_id: String,
    /// Received signal strength in dBm
    pub rssi: f32,
}

impl BeaconReading {
    pub fn new(beacon_id: impl Into<String>, rssi: f32) -> Self {
        Self {
            beacon_id: beacon_id.into(),
            rssi,
        }
    }
}

/// Result of one radio scan: at most one RSSI per beacon, ordered by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RadioScan {
    signals: BTreeMap<String, f32>,
}

impl RadioScan {
    /// Empty scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scan from readings. A repeated beacon keeps its last reading.
    pub fn from_readings<I>(readings: I) -> Self
    where
        I: IntoIterator<Item = BeaconReading>,
    {
        let mut scan = Self::new();
        for reading in readings {
            scan.insert(reading.beacon_id, reading.rssi);
        }
        scan
    }

    /// Record a reading, replacing any previous value for the same beacon.
    pub fn insert(&mut self, beacon_id: impl Into<String>, rssi: f32) {
        self.signals.insert(beacon_id.into(), rssi);
    }

    /// RSSI of a beacon, if it was heard.
    pub fn rssi(&self, beacon_id: &str) -> Option<f32> {
        self.signals.get(beacon_id).copied()
    }

    /// Signal map keyed by beacon id.
    pub fn signals(&self) -> &BTreeMap<String, f32> {
        &self.signals
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Iterate readings in beacon-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.signals.iter().map(|(id, rssi)| (id.as_str(), *rssi))
    }
}

impl FromIterator<(String, f32)> for RadioScan {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        Self {
            signals: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accel_magnitude() {
        let s = InertialSample::new([3.0, 4.0, 0.0], [0.0; 3]);
        assert_relative_eq!(s.accel_magnitude(), 5.0);
    }

    #[test]
    fn test_sample_finite_check() {
        assert!(InertialSample::new([0.0, 0.0, 9.81], [0.0; 3]).is_finite());
        assert!(!InertialSample::new([0.0, f32::NAN, 9.81], [0.0; 3]).is_finite());
        assert!(!InertialSample::new([0.0; 3], [0.0, 0.0, f32::INFINITY]).is_finite());
    }

    #[test]
    fn test_scan_duplicate_beacon_keeps_last() {
        let scan = RadioScan::from_readings(vec![
            BeaconReading::new("B1", -60.0),
            BeaconReading::new("B2", -70.0),
            BeaconReading::new("B1", -55.0),
        ]);
        assert_eq!(scan.len(), 2);
        assert_eq!(scan.rssi("B1"), Some(-55.0));
        assert_eq!(scan.rssi("B3"), None);
    }

    #[test]
    fn test_scan_iterates_in_id_order() {
        let scan: RadioScan = vec![("B2".to_string(), -70.0), ("B1".to_string(), -60.0)]
            .into_iter()
            .collect();
        let ids: Vec<&str> = scan.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["B1", "B2"]);
    }
}
