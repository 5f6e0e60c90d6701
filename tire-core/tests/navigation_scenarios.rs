//! End-to-end navigation scenarios on the demo hallway.
//!
//! ```text
//!   START (0,0) ── 5m ── MIDDLE (0,5) ── 5m ── END (0,10)
//! ```
//!
//! Run with: `cargo test --test navigation_scenarios`

use approx::assert_relative_eq;
use std::f32::consts::FRAC_PI_2;
use std::time::Instant;
use tire_core::io::map_loader::{HALLWAY_END, HALLWAY_MIDDLE, HALLWAY_START, demo_hallway};
use tire_core::{
    AStarPlanner, Announcer, AudioCue, Ekf, FingerprintLocalizer, GRAVITY, GuidanceState,
    InertialSample, LocalizerConfig, PdrProcessor, Point2D, RadioScan, Route, find_path,
};

fn scan_at(rp_id: &str) -> RadioScan {
    let (_, radio_map) = demo_hallway().unwrap();
    let fingerprint = radio_map.iter().find(|fp| fp.rp_id == rp_id).unwrap();
    fingerprint
        .signal_strengths
        .iter()
        .map(|(id, rssi)| (id.clone(), *rssi))
        .collect()
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_route_through_middle() {
    let (graph, _) = demo_hallway().unwrap();
    let result = AStarPlanner::with_defaults(&graph).plan(HALLWAY_START, HALLWAY_END);

    assert!(result.success);
    assert_eq!(
        result.route,
        Route::from(vec![HALLWAY_START, HALLWAY_MIDDLE, HALLWAY_END])
    );
    assert_relative_eq!(result.cost, 10.0);
}

#[test]
fn test_unknown_destination() {
    let (graph, _) = demo_hallway().unwrap();
    assert!(find_path(&graph, HALLWAY_START, "RP_CAFETERIA").is_empty());
}

// ============================================================================
// Localization
// ============================================================================

#[test]
fn test_exact_fingerprint_k1() {
    let (_, radio_map) = demo_hallway().unwrap();
    let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 1 });
    localizer.load(radio_map);

    for (rp, y) in [(HALLWAY_START, 0.0), (HALLWAY_MIDDLE, 5.0), (HALLWAY_END, 10.0)] {
        assert_eq!(localizer.estimate(&scan_at(rp)), Some(Point2D::new(0.0, y)));
        assert_eq!(localizer.nearest(&scan_at(rp))[0].rp_id, rp);
    }
}

#[test]
fn test_fixes_pull_drifted_estimate_back() {
    let (_, radio_map) = demo_hallway().unwrap();
    let mut localizer = FingerprintLocalizer::new(LocalizerConfig { k: 1 });
    localizer.load(radio_map);

    let mut ekf = Ekf::default();
    ekf.initialize(3.0, 0.0, FRAC_PI_2);

    let fix = localizer.estimate(&scan_at(HALLWAY_START)).unwrap();
    for _ in 0..200 {
        assert!(ekf.update(fix));
    }

    let pose = ekf.state();
    assert!(pose.position().distance(&Point2D::new(0.0, 0.0)) < 0.05);
    assert_relative_eq!(pose.theta, FRAC_PI_2, epsilon = 1e-5);
}

// ============================================================================
// Guided walk
// ============================================================================

/// Walk north from START in 0.6 s strides, announcing after every stride.
#[test]
fn test_guided_walk_down_hallway() {
    let (graph, _) = demo_hallway().unwrap();
    let mut pdr = PdrProcessor::default();
    let mut ekf = Ekf::default();
    ekf.initialize(0.0, 0.0, FRAC_PI_2);

    let mut announcer = Announcer::default();
    announcer.accept_route(find_path(&graph, HALLWAY_START, HALLWAY_END));
    assert_eq!(announcer.next_target(), Some(HALLWAY_MIDDLE));

    let heel_strike = InertialSample::new([0.0, 0.0, 14.0], [0.0; 3]);
    let standing = InertialSample::new([0.0, 0.0, GRAVITY], [0.0; 3]);
    let now = Instant::now();

    let mut cues = Vec::new();
    for _ in 0..22 {
        for _ in 0..5 {
            pdr.ingest(&heel_strike, 0.02);
        }
        for _ in 0..25 {
            pdr.ingest(&standing, 0.02);
        }
        ekf.predict(&pdr.drain());
        cues.extend(announcer.update(&ekf.state(), &graph, now));
    }

    assert_eq!(
        cues,
        vec![
            AudioCue::Landmark("guidance_middle.wav".into()),
            AudioCue::Landmark("guidance_end.wav".into()),
            AudioCue::DestinationReached,
        ]
    );
    assert_eq!(announcer.state(), GuidanceState::Arrived);
}
