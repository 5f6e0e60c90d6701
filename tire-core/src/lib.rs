//! TIRE core - indoor pedestrian navigation for visually impaired users.
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Persistence
//! │              (navigation + radio maps)              │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  navigation/                        │  ← Guidance
//! │            (graph, route, announcer)                │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  algorithms/                        │  ← Core algorithms
//! │         (localization, fusion, planning)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Sensor processing
//! │              (pedestrian dead reckoning)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Data flow
//!
//! One control cycle, driven by the binary:
//!
//! - inertial sample → [`PdrProcessor::ingest`], then [`PdrProcessor::drain`]
//!   yields a [`StepEvent`]
//! - [`Ekf::predict`] with the step event
//! - radio scan (asynchronous) → [`FingerprintLocalizer::estimate`] →
//!   [`Ekf::update`]
//! - fused pose → [`Announcer::update`] → optional [`AudioCue`]
//!
//! Routes come from [`find_path`] over the [`NavigationGraph`] when the user
//! picks a destination.
//!
//! Nothing in this crate performs I/O except the map loaders, and nothing in
//! the per-cycle path returns an error: missing data yields `None` or an
//! empty route and is logged.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;
pub mod error;

// ============================================================================
// Layer 2: Sensor processing (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Algorithms (depends on core, sensors)
// ============================================================================
pub mod algorithms;

// ============================================================================
// Layer 4: Navigation (depends on core, algorithms)
// ============================================================================
pub mod navigation;

// ============================================================================
// Layer 5: I/O infrastructure (depends on all layers)
// ============================================================================
pub mod io;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use core::math;
pub use core::types::{AudioCue, BeaconReading, Covariance2D, InertialSample, RadioScan};
pub use core::types::{Point2D, Pose2D};
pub use error::{GraphError, MapError};

// Sensors
pub use sensors::{GRAVITY, PdrConfig, PdrProcessor, StepEvent};

// Algorithms
pub use algorithms::fusion::{Ekf, EkfConfig, MeasurementNoise, ProcessNoise};
pub use algorithms::localization::{
    FingerprintLocalizer, LocalizerConfig, Neighbor, RadioMap, RpFingerprint,
    fingerprint_distance,
};
pub use algorithms::planning::{AStarConfig, AStarPlanner, PathFailure, PathResult, find_path};

// Navigation
pub use navigation::{
    Announcer, GraphNode, GuidanceConfig, GuidanceState, NavigationGraph, NavigationSession, Route,
};
