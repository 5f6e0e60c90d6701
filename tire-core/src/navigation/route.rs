//! Planned route through the navigation graph.

use super::graph::NavigationGraph;
use serde::{Deserialize, Serialize};

/// Ordered node ids from start to goal, both inclusive.
///
/// An empty route means "no route".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    nodes: Vec<String>,
}

impl Route {
    pub fn new(nodes: Vec<String>) -> Self {
        Self { nodes }
    }

    /// The "no route" value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(String::as_str)
    }

    pub fn start(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn goal(&self) -> Option<&str> {
        self.nodes.last().map(String::as_str)
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Sum of edge weights along the route.
    ///
    /// `None` if two consecutive nodes are not joined by an edge.
    pub fn total_cost(&self, graph: &NavigationGraph) -> Option<f32> {
        self.nodes
            .windows(2)
            .map(|pair| graph.edge_weight(&pair[0], &pair[1]))
            .sum()
    }
}

impl From<Vec<&str>> for Route {
    fn from(nodes: Vec<&str>) -> Self {
        Self::new(nodes.into_iter().map(String::from).collect())
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("<no route>")
        } else {
            f.write_str(&self.nodes.join(" -> "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::GraphNode;
    use approx::assert_relative_eq;

    #[test]
    fn test_total_cost() {
        let mut graph = NavigationGraph::new();
        graph.add_node(GraphNode::new("A", 0.0, 0.0)).unwrap();
        graph.add_node(GraphNode::new("B", 0.0, 5.0)).unwrap();
        graph.add_node(GraphNode::new("C", 0.0, 10.0)).unwrap();
        graph.connect("A", "B").unwrap();
        graph.connect("B", "C").unwrap();

        let route = Route::from(vec!["A", "B", "C"]);
        assert_relative_eq!(route.total_cost(&graph).unwrap(), 10.0);
        assert_eq!(Route::from(vec!["A", "C"]).total_cost(&graph), None);
        assert_eq!(Route::from(vec!["A"]).total_cost(&graph), Some(0.0));
    }

    #[test]
    fn test_accessors_and_display() {
        let route = Route::from(vec!["A", "B"]);
        assert_eq!(route.start(), Some("A"));
        assert_eq!(route.goal(), Some("B"));
        assert_eq!(route.to_string(), "A -> B");
        assert_eq!(Route::empty().to_string(), "<no route>");
        assert!(Route::empty().goal().is_none());
    }
}
