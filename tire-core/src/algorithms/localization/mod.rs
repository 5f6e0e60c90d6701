//! Absolute localization from radio scans.
//!
//! # Components
//!
//! - [`FingerprintLocalizer`]: k-NN position estimate over a radio map
//! - [`fingerprint_distance`]: RSSI distance with missing-beacon penalty
//!
//! # Example
//!
//! ```
//! use tire_core::algorithms::localization::{
//!     FingerprintLocalizer, LocalizerConfig, RpFingerprint,
//! };
//! use tire_core::core::types::{Point2D, RadioScan};
//!
//! let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 1 });
//! localizer.load(vec![
//!     RpFingerprint::new("LOBBY", Point2D::new(2.0, 3.0)).with_signal("B1", -55.0),
//! ]);
//!
//! let scan: RadioScan = vec![("B1".to_string(), -55.0)].into_iter().collect();
//! assert_eq!(localizer.estimate(&scan), Some(Point2D::new(2.0, 3.0)));
//! ```

mod fingerprint;

pub use fingerprint::{
    FingerprintLocalizer, LocalizerConfig, MISSING_RSSI, Neighbor, RadioMap, RpFingerprint,
    fingerprint_distance,
};
