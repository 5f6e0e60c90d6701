//! A* search over the navigation graph.
//!
//! - `g`: best known cost from the start (+∞ until reached)
//! - `h`: straight-line distance to the goal
//! - frontier: min-heap on `f = g + h`, equal `f` popped in insertion order
//!
//! The heuristic is admissible as long as no edge is cheaper than the
//! straight line between its endpoints. Map data is expected to respect this;
//! it is not checked here.

use crate::navigation::{NavigationGraph, Route};
use log::{debug, trace, warn};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A* configuration.
#[derive(Clone, Debug)]
pub struct AStarConfig {
    /// Maximum number of nodes to expand before giving up
    pub max_iterations: usize,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
        }
    }
}

/// Reason for path failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathFailure {
    /// Start id is not in the graph
    UnknownStart,
    /// Goal id is not in the graph
    UnknownGoal,
    /// Frontier exhausted without reaching the goal
    NoPath,
    /// Maximum iterations exceeded
    MaxIterationsExceeded,
}

/// Result of a search.
#[derive(Clone, Debug)]
pub struct PathResult {
    /// Route from start to goal (empty if no path found)
    pub route: Route,
    /// Total edge cost of the route
    pub cost: f32,
    /// Number of nodes expanded during search
    pub nodes_expanded: usize,
    /// Whether a path was found
    pub success: bool,
    /// Reason for failure (if any)
    pub failure_reason: Option<PathFailure>,
}

impl PathResult {
    fn failed(reason: PathFailure, nodes_expanded: usize) -> Self {
        Self {
            route: Route::empty(),
            cost: f32::INFINITY,
            nodes_expanded,
            success: false,
            failure_reason: Some(reason),
        }
    }
}

/// Frontier entry.
#[derive(Clone, Debug)]
struct FrontierEntry<'g> {
    id: &'g str,
    g_cost: f32,
    f_cost: f32,
    /// Push order, breaks ties between equal f
    seq: u64,
}

impl Eq for FrontierEntry<'_> {}

impl PartialEq for FrontierEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Ord for FrontierEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior, earlier push wins ties
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* pathfinder bound to one graph.
pub struct AStarPlanner<'a> {
    graph: &'a NavigationGraph,
    config: AStarConfig,
}

impl<'a> AStarPlanner<'a> {
    pub fn new(graph: &'a NavigationGraph, config: AStarConfig) -> Self {
        Self { graph, config }
    }

    /// Create with default configuration
    pub fn with_defaults(graph: &'a NavigationGraph) -> Self {
        Self::new(graph, AStarConfig::default())
    }

    /// Search for the cheapest route from `start` to `goal`.
    pub fn plan(&self, start: &str, goal: &str) -> PathResult {
        trace!("[AStar] plan: start={} goal={}", start, goal);

        let Some(start_node) = self.graph.get_node(start) else {
            warn!("[AStar] FAILED: unknown start node '{}'", start);
            return PathResult::failed(PathFailure::UnknownStart, 0);
        };
        if !self.graph.contains(goal) {
            warn!("[AStar] FAILED: unknown goal node '{}'", goal);
            return PathResult::failed(PathFailure::UnknownGoal, 0);
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set: HashSet<&str> = HashSet::new();
        let mut came_from: HashMap<&str, &str> = HashMap::new();
        let mut g_scores: HashMap<&str, f32> = HashMap::new();
        let mut seq = 0u64;

        let start_id = start_node.id.as_str();
        g_scores.insert(start_id, 0.0);
        open_set.push(FrontierEntry {
            id: start_id,
            g_cost: 0.0,
            f_cost: self.heuristic(start_id, goal),
            seq,
        });

        let mut nodes_expanded = 0;

        while let Some(current) = open_set.pop() {
            if current.id == goal {
                let route = reconstruct_route(&came_from, current.id);
                debug!(
                    "[AStar] Found {} ({} nodes, cost {:.2}, {} expanded)",
                    route,
                    route.len(),
                    current.g_cost,
                    nodes_expanded
                );
                return PathResult {
                    route,
                    cost: current.g_cost,
                    nodes_expanded,
                    success: true,
                    failure_reason: None,
                };
            }

            if !closed_set.insert(current.id) {
                continue;
            }

            nodes_expanded += 1;
            if nodes_expanded > self.config.max_iterations {
                warn!(
                    "[AStar] FAILED: MaxIterationsExceeded ({} nodes)",
                    nodes_expanded
                );
                return PathResult::failed(PathFailure::MaxIterationsExceeded, nodes_expanded);
            }

            let Some(node) = self.graph.get_node(current.id) else {
                continue;
            };

            for (neighbor, &weight) in &node.neighbors {
                let Some(neighbor_node) = self.graph.get_node(neighbor) else {
                    debug!("[AStar] Skipping edge {} -> unknown {}", current.id, neighbor);
                    continue;
                };
                let neighbor_id = neighbor_node.id.as_str();
                if closed_set.contains(neighbor_id) {
                    continue;
                }

                let tentative_g = current.g_cost + weight;
                let known_g = g_scores.get(neighbor_id).copied().unwrap_or(f32::INFINITY);

                if tentative_g < known_g {
                    came_from.insert(neighbor_id, current.id);
                    g_scores.insert(neighbor_id, tentative_g);
                    seq += 1;
                    open_set.push(FrontierEntry {
                        id: neighbor_id,
                        g_cost: tentative_g,
                        f_cost: tentative_g + self.heuristic(neighbor_id, goal),
                        seq,
                    });
                }
            }
        }

        debug!(
            "[AStar] FAILED: NoPath from {} to {} ({} expanded)",
            start, goal, nodes_expanded
        );
        PathResult::failed(PathFailure::NoPath, nodes_expanded)
    }

    fn heuristic(&self, from: &str, goal: &str) -> f32 {
        self.graph.distance(from, goal).unwrap_or(0.0)
    }
}

fn reconstruct_route(came_from: &HashMap<&str, &str>, goal: &str) -> Route {
    let mut nodes = vec![goal.to_string()];
    let mut current = goal;
    while let Some(&prev) = came_from.get(current) {
        nodes.push(prev.to_string());
        current = prev;
    }
    nodes.reverse();
    Route::new(nodes)
}

/// Cheapest route from `start` to `goal`; empty if none exists or either id
/// is unknown.
pub fn find_path(graph: &NavigationGraph, start: &str, goal: &str) -> Route {
    AStarPlanner::with_defaults(graph).plan(start, goal).route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::GraphNode;
    use approx::assert_relative_eq;

    fn graph_of(nodes: &[(&str, f32, f32)], edges: &[(&str, &str, f32)]) -> NavigationGraph {
        let mut graph = NavigationGraph::new();
        for &(id, x, y) in nodes {
            graph.add_node(GraphNode::new(id, x, y)).unwrap();
        }
        for &(a, b, w) in edges {
            graph.add_edge(a, b, w).unwrap();
        }
        graph
    }

    #[test]
    fn test_colinear_hallway() {
        let mut graph = graph_of(&[("A", 0.0, 0.0), ("B", 0.0, 5.0), ("C", 0.0, 10.0)], &[]);
        graph.connect("A", "B").unwrap();
        graph.connect("B", "C").unwrap();

        let result = AStarPlanner::with_defaults(&graph).plan("A", "C");
        assert!(result.success);
        assert_eq!(result.route, Route::from(vec!["A", "B", "C"]));
        assert_relative_eq!(result.cost, 10.0);
    }

    #[test]
    fn test_prefers_cheaper_detour() {
        // Direct edge A->D is expensive; A->B->C->D is cheaper overall
        let graph = graph_of(
            &[("A", 0.0, 0.0), ("B", 1.0, 1.0), ("C", 2.0, 1.0), ("D", 3.0, 0.0)],
            &[("A", "D", 10.0), ("A", "B", 1.5), ("B", "C", 1.0), ("C", "D", 1.5)],
        );
        let result = AStarPlanner::with_defaults(&graph).plan("A", "D");
        assert_eq!(result.route, Route::from(vec!["A", "B", "C", "D"]));
        assert_relative_eq!(result.cost, 4.0);
        assert_relative_eq!(result.route.total_cost(&graph).unwrap(), result.cost);
    }

    #[test]
    fn test_directed_edges_respected() {
        let graph = graph_of(&[("A", 0.0, 0.0), ("B", 1.0, 0.0)], &[("A", "B", 1.0)]);
        assert_eq!(find_path(&graph, "A", "B").len(), 2);
        assert!(find_path(&graph, "B", "A").is_empty());

        let result = AStarPlanner::with_defaults(&graph).plan("B", "A");
        assert_eq!(result.failure_reason, Some(PathFailure::NoPath));
    }

    #[test]
    fn test_unknown_ids_give_empty_route() {
        let graph = graph_of(&[("A", 0.0, 0.0)], &[]);
        assert!(find_path(&graph, "A", "Z").is_empty());
        assert!(find_path(&graph, "Z", "A").is_empty());

        let planner = AStarPlanner::with_defaults(&graph);
        assert_eq!(planner.plan("Z", "A").failure_reason, Some(PathFailure::UnknownStart));
        assert_eq!(planner.plan("A", "Z").failure_reason, Some(PathFailure::UnknownGoal));
        assert!(planner.plan("Z", "A").cost.is_infinite());
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = graph_of(&[("A", 0.0, 0.0)], &[]);
        let result = AStarPlanner::with_defaults(&graph).plan("A", "A");
        assert!(result.success);
        assert_eq!(result.route, Route::from(vec!["A"]));
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn test_unreachable_island() {
        let mut graph = graph_of(
            &[("A", 0.0, 0.0), ("B", 1.0, 0.0), ("X", 5.0, 5.0), ("Y", 6.0, 5.0)],
            &[],
        );
        graph.connect("A", "B").unwrap();
        graph.connect("X", "Y").unwrap();
        assert!(find_path(&graph, "A", "Y").is_empty());
    }

    #[test]
    fn test_grid_optimal_cost() {
        // 4x4 lattice, unit edges both ways; Manhattan distance is optimal
        let mut graph = NavigationGraph::new();
        for i in 0..4 {
            for j in 0..4 {
                graph
                    .add_node(GraphNode::new(format!("{}_{}", i, j), i as f32, j as f32))
                    .unwrap();
            }
        }
        for i in 0..4 {
            for j in 0..4 {
                if i + 1 < 4 {
                    graph.connect(&format!("{}_{}", i, j), &format!("{}_{}", i + 1, j)).unwrap();
                }
                if j + 1 < 4 {
                    graph.connect(&format!("{}_{}", i, j), &format!("{}_{}", i, j + 1)).unwrap();
                }
            }
        }
        let result = AStarPlanner::with_defaults(&graph).plan("0_0", "3_3");
        assert!(result.success);
        assert_relative_eq!(result.cost, 6.0);
        assert_eq!(result.route.len(), 7);
    }

    #[test]
    fn test_max_iterations() {
        let mut graph = graph_of(&[("A", 0.0, 0.0), ("B", 1.0, 0.0), ("C", 2.0, 0.0)], &[]);
        graph.connect("A", "B").unwrap();
        graph.connect("B", "C").unwrap();
        let planner = AStarPlanner::new(&graph, AStarConfig { max_iterations: 1 });
        let result = planner.plan("A", "C");
        assert_eq!(result.failure_reason, Some(PathFailure::MaxIterationsExceeded));
        assert!(result.route.is_empty());
    }

    #[test]
    fn test_frontier_ties_pop_in_push_order() {
        let mut heap = BinaryHeap::new();
        for (seq, id) in ["first", "second", "third"].iter().enumerate() {
            heap.push(FrontierEntry {
                id,
                g_cost: 0.0,
                f_cost: 1.0,
                seq: seq as u64,
            });
        }
        heap.push(FrontierEntry {
            id: "cheap",
            g_cost: 0.0,
            f_cost: 0.5,
            seq: 9,
        });
        let order: Vec<&str> = std::iter::from_fn(|| heap.pop().map(|e| e.id)).collect();
        assert_eq!(order, vec!["cheap", "first", "second", "third"]);
    }
}
