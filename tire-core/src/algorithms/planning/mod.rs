//! Route planning over the navigation graph.
//!
//! # Usage
//!
//! ```
//! use tire_core::algorithms::planning::{AStarPlanner, find_path};
//! use tire_core::navigation::{GraphNode, NavigationGraph};
//!
//! let mut graph = NavigationGraph::new();
//! graph.add_node(GraphNode::new("A", 0.0, 0.0)).unwrap();
//! graph.add_node(GraphNode::new("B", 0.0, 5.0)).unwrap();
//! graph.connect("A", "B").unwrap();
//!
//! let result = AStarPlanner::with_defaults(&graph).plan("A", "B");
//! assert!(result.success);
//! assert_eq!(find_path(&graph, "B", "A").len(), 2);
//! ```

mod astar;

pub use astar::{AStarConfig, AStarPlanner, PathFailure, PathResult, find_path};
