//! BLE fingerprint localization by k-nearest-neighbors.
//!
//! The radio map is a table of reference points (RPs), each with the RSSI
//! signature recorded there. A live scan is compared against every signature
//! and the positions of the `k` closest RPs are averaged.
//!
//! # Signal distance
//!
//! ```text
//! d(a, b) = sqrt( Σ_{id ∈ ids(a) ∪ ids(b)} (a[id] − b[id])² )
//! ```
//!
//! A beacon heard on only one side contributes as if the other side heard
//! it at [`MISSING_RSSI`]. The metric is symmetric by construction.

use crate::core::types::{Point2D, RadioScan};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// RSSI substituted for a beacon that was not heard (dBm).
pub const MISSING_RSSI: f32 = -100.0;

/// Recorded signature of one reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpFingerprint {
    /// Reference point id (usually matches a graph node id)
    pub rp_id: String,
    /// Where the signature was recorded
    pub position: Point2D,
    /// Beacon id → RSSI (dBm)
    pub signal_strengths: BTreeMap<String, f32>,
}

impl RpFingerprint {
    pub fn new(rp_id: impl Into<String>, position: Point2D) -> Self {
        Self {
            rp_id: rp_id.into(),
            position,
            signal_strengths: BTreeMap::new(),
        }
    }

    /// Builder-style signal insertion.
    pub fn with_signal(mut self, beacon_id: impl Into<String>, rssi: f32) -> Self {
        self.signal_strengths.insert(beacon_id.into(), rssi);
        self
    }
}

/// Static table of reference fingerprints, in load order.
pub type RadioMap = Vec<RpFingerprint>;

/// Euclidean RSSI distance over the union of beacon ids.
///
/// Terms are summed in beacon-id order so `d(a, b)` and `d(b, a)` are
/// bit-identical.
pub fn fingerprint_distance(a: &BTreeMap<String, f32>, b: &BTreeMap<String, f32>) -> f32 {
    let union: BTreeSet<&String> = a.keys().chain(b.keys()).collect();

    union
        .into_iter()
        .map(|id| {
            let ra = a.get(id).copied().unwrap_or(MISSING_RSSI);
            let rb = b.get(id).copied().unwrap_or(MISSING_RSSI);
            (ra - rb) * (ra - rb)
        })
        .sum::<f32>()
        .sqrt()
}

/// Configuration for [`FingerprintLocalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    /// Number of neighbors averaged (values below 1 act as 1)
    pub k: usize,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self { k: 3 }
    }
}

/// A ranked radio map entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub rp_id: String,
    pub position: Point2D,
    /// Signal distance to the live scan
    pub distance: f32,
}

/// k-NN position estimator over a radio map.
#[derive(Debug, Clone, Default)]
pub struct FingerprintLocalizer {
    config: LocalizerConfig,
    radio_map: RadioMap,
}

impl FingerprintLocalizer {
    pub fn new(config: LocalizerConfig) -> Self {
        Self {
            config,
            radio_map: Vec::new(),
        }
    }

    /// Replace the radio map.
    pub fn load(&mut self, radio_map: RadioMap) {
        log::info!("[Localizer] Loaded {} reference points", radio_map.len());
        self.radio_map = radio_map;
    }

    /// Effective neighbor count.
    #[inline]
    pub fn k(&self) -> usize {
        self.config.k.max(1)
    }

    pub fn radio_map(&self) -> &[RpFingerprint] {
        &self.radio_map
    }

    /// Every reference point ranked by signal distance, closest first.
    ///
    /// Equal distances keep radio map order.
    pub fn nearest(&self, scan: &RadioScan) -> Vec<Neighbor> {
        let mut ranked: Vec<Neighbor> = self
            .radio_map
            .iter()
            .map(|rp| Neighbor {
                rp_id: rp.rp_id.clone(),
                position: rp.position,
                distance: fingerprint_distance(scan.signals(), &rp.signal_strengths),
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked
    }

    /// Position estimate: mean position of the `k` closest reference points.
    ///
    /// Returns `None` when no radio map is loaded or the scan carries a
    /// non-finite RSSI.
    pub fn estimate(&self, scan: &RadioScan) -> Option<Point2D> {
        if self.radio_map.is_empty() {
            log::warn!("[Localizer] Radio map is empty, no position estimate");
            return None;
        }
        if let Some((beacon, rssi)) = scan.iter().find(|(_, rssi)| !rssi.is_finite()) {
            log::warn!("[Localizer] Rejecting scan, {} reported RSSI {}", beacon, rssi);
            return None;
        }

        let ranked = self.nearest(scan);
        let used = self.k().min(ranked.len());
        let (sx, sy) = ranked[..used]
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), n| {
                (sx + n.position.x, sy + n.position.y)
            });
        let estimate = Point2D::new(sx / used as f32, sy / used as f32);

        log::debug!(
            "[Localizer] {} beacons -> ({:.2}, {:.2}) from {} RPs, best {} at {:.1}",
            scan.len(),
            estimate.x,
            estimate.y,
            used,
            ranked[0].rp_id,
            ranked[0].distance
        );

        Some(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn signals(pairs: &[(&str, f32)]) -> BTreeMap<String, f32> {
        pairs.iter().map(|(id, r)| (id.to_string(), *r)).collect()
    }

    fn scan(pairs: &[(&str, f32)]) -> RadioScan {
        pairs.iter().map(|(id, r)| (id.to_string(), *r)).collect()
    }

    fn hallway() -> RadioMap {
        vec![
            RpFingerprint::new("START", Point2D::new(0.0, 0.0))
                .with_signal("B1", -50.0)
                .with_signal("B2", -80.0)
                .with_signal("B3", -90.0),
            RpFingerprint::new("MIDDLE", Point2D::new(0.0, 5.0))
                .with_signal("B1", -65.0)
                .with_signal("B2", -65.0)
                .with_signal("B3", -85.0),
            RpFingerprint::new("END", Point2D::new(0.0, 10.0))
                .with_signal("B1", -90.0)
                .with_signal("B2", -50.0)
                .with_signal("B3", -80.0),
        ]
    }

    #[test]
    fn test_distance_identical_is_zero() {
        let a = signals(&[("B1", -60.0), ("B2", -70.0)]);
        assert_eq!(fingerprint_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_missing_beacon_penalty() {
        let a = signals(&[("B1", -60.0)]);
        let b = signals(&[("B1", -60.0), ("B2", -70.0)]);
        // B2 missing on side a: (-100 - -70)² = 900
        assert_relative_eq!(fingerprint_distance(&a, &b), 30.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let cases = [
            (signals(&[("B1", -60.0), ("B2", -70.0)]), signals(&[("B2", -75.0), ("B3", -40.0)])),
            (signals(&[("A", -50.0)]), signals(&[("Z", -90.0)])),
            (signals(&[]), signals(&[("B1", -55.0)])),
            (signals(&[("B1", -55.0), ("B2", -66.0)]), signals(&[("B1", -58.0), ("B2", -61.0)])),
        ];
        for (a, b) in &cases {
            assert_eq!(fingerprint_distance(a, b), fingerprint_distance(b, a));
        }
    }

    #[test]
    fn test_distance_disjoint() {
        let a = signals(&[("A", -50.0)]);
        let b = signals(&[("Z", -90.0)]);
        // (−50+100)² + (−100+90)² = 2500 + 100
        assert_relative_eq!(fingerprint_distance(&a, &b), 2600.0f32.sqrt());
    }

    #[test]
    fn test_knn_exact_match_k1() {
        let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 1 });
        localizer.load(hallway());

        let at_middle = scan(&[("B1", -65.0), ("B2", -65.0), ("B3", -85.0)]);
        let p = localizer.estimate(&at_middle).unwrap();
        assert_eq!(p, Point2D::new(0.0, 5.0));

        let at_end = scan(&[("B1", -90.0), ("B2", -50.0), ("B3", -80.0)]);
        assert_eq!(localizer.estimate(&at_end).unwrap(), Point2D::new(0.0, 10.0));
    }

    #[test]
    fn test_knn_averages_k_nearest() {
        let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 2 });
        localizer.load(hallway());

        // Closest to START, then MIDDLE
        let near_start = scan(&[("B1", -52.0), ("B2", -78.0), ("B3", -90.0)]);
        let p = localizer.estimate(&near_start).unwrap();
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 2.5);
    }

    #[test]
    fn test_k_larger_than_map_uses_all() {
        let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 10 });
        localizer.load(hallway());
        let p = localizer.estimate(&scan(&[("B1", -60.0)])).unwrap();
        assert_relative_eq!(p.y, 5.0);
    }

    #[test]
    fn test_k_zero_acts_as_one() {
        let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 0 });
        localizer.load(hallway());
        assert_eq!(localizer.k(), 1);
        let at_start = scan(&[("B1", -50.0), ("B2", -80.0), ("B3", -90.0)]);
        assert_eq!(localizer.estimate(&at_start).unwrap(), Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_empty_radio_map_returns_none() {
        let localizer = FingerprintLocalizer::default();
        assert!(localizer.estimate(&scan(&[("B1", -60.0)])).is_none());
    }

    #[test]
    fn test_non_finite_rssi_rejected() {
        let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 1 });
        localizer.load(hallway());

        // Matches END exactly apart from the bad reading
        let at_end = scan(&[("B1", -90.0), ("B2", -50.0), ("B3", -80.0), ("B4", f32::NAN)]);
        assert!(localizer.estimate(&at_end).is_none());

        let infinite = scan(&[("B1", f32::NEG_INFINITY), ("B2", -50.0)]);
        assert!(localizer.estimate(&infinite).is_none());
    }

    #[test]
    fn test_ties_keep_load_order() {
        let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 1 });
        localizer.load(vec![
            RpFingerprint::new("FIRST", Point2D::new(1.0, 1.0)).with_signal("B1", -60.0),
            RpFingerprint::new("SECOND", Point2D::new(9.0, 9.0)).with_signal("B1", -60.0),
        ]);
        let ranked = localizer.nearest(&scan(&[("B1", -60.0)]));
        assert_eq!(ranked[0].rp_id, "FIRST");
        assert_eq!(ranked[1].rp_id, "SECOND");
        assert_eq!(
            localizer.estimate(&scan(&[("B1", -60.0)])).unwrap(),
            Point2D::new(1.0, 1.0)
        );
    }
}
