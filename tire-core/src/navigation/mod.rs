//! Navigation graph, routes and spoken guidance.
//!
//! ```text
//! NavigationGraph            ← named reference points + weighted edges
//!     │
//!     │ find_path()  (algorithms::planning)
//!     ▼
//! Route                      ← ordered node ids
//!     │
//!     │ accept_route()
//!     ▼
//! Announcer                  ← pose → AudioCue, one per cycle at most
//! ```

mod announcer;
mod graph;
mod route;

pub use announcer::{Announcer, GuidanceConfig, GuidanceState, NavigationSession};
pub use graph::{GraphNode, NavigationGraph};
pub use route::Route;
