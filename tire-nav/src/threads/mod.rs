//! Worker threads for tire-nav.
//!
//! The control loop runs on its own thread and owns the device. Radio scans
//! block for up to a second, so they run on a separate worker:
//!
//! ```text
//! ┌──────────────┐  ScanRequest (bounded 1)  ┌──────────────┐
//! │ control loop │ ────────────────────────▶ │ scan worker  │
//! │    (50 Hz)   │ ◀──────────────────────── │ RadioScanner │
//! └──────────────┘  ScanResult (bounded 1)   └──────────────┘
//! ```

mod scan;

pub use scan::{ScanResult, ScanWorker};
