//! Indoor navigation graph of named reference points.
//!
//! Edges are directed and carry their own weight, so a corridor can cost
//! more one way than the other. [`NavigationGraph::connect`] adds the common
//! symmetric case with the straight-line length as weight.

use crate::core::types::Point2D;
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One reference point of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub position: Point2D,
    /// Human readable name ("Main entrance")
    pub display_name: String,
    /// Cue played when the node is reached; empty for a plain checkpoint
    pub audio_cue: String,
    /// Outgoing edges: neighbor id → traversal cost (m)
    pub neighbors: BTreeMap<String, f32>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            position: Point2D::new(x, y),
            audio_cue: String::new(),
            neighbors: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_audio(mut self, audio_cue: impl Into<String>) -> Self {
        self.audio_cue = audio_cue.into();
        self
    }
}

/// Weighted directed graph keyed by node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationGraph {
    nodes: BTreeMap<String, GraphNode>,
}

impl NavigationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from nodes that already carry their edges.
    ///
    /// Every edge target must be one of the given nodes.
    pub fn from_nodes<I>(nodes: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = GraphNode>,
    {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        for node in graph.nodes.values() {
            for (to, &weight) in &node.neighbors {
                if !graph.nodes.contains_key(to) {
                    return Err(GraphError::UnknownNode(to.clone()));
                }
                check_weight(&node.id, to, weight)?;
            }
        }
        Ok(graph)
    }

    /// Insert a node. Ids must be unique.
    pub fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add or replace the directed edge `from → to`.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: f32) -> Result<(), GraphError> {
        if !self.nodes.contains_key(to) {
            return Err(GraphError::UnknownNode(to.to_string()));
        }
        check_weight(from, to, weight)?;
        let node = self
            .nodes
            .get_mut(from)
            .ok_or_else(|| GraphError::UnknownNode(from.to_string()))?;
        node.neighbors.insert(to.to_string(), weight);
        Ok(())
    }

    /// Connect two nodes both ways, weighted by their straight-line distance.
    ///
    /// Returns the weight used.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<f32, GraphError> {
        let weight = self
            .distance(a, b)
            .ok_or_else(|| GraphError::UnknownNode(self.missing_of(a, b)))?;
        self.add_edge(a, b, weight)?;
        self.add_edge(b, a, weight)?;
        Ok(weight)
    }

    fn missing_of(&self, a: &str, b: &str) -> String {
        if self.nodes.contains_key(a) { b } else { a }.to_string()
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in id order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Straight-line distance between two node positions, edge or not.
    pub fn distance(&self, a: &str, b: &str) -> Option<f32> {
        let pa = self.nodes.get(a)?.position;
        let pb = self.nodes.get(b)?.position;
        Some(pa.distance(&pb))
    }

    /// Weight of the edge `from → to`, if present.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f32> {
        self.nodes.get(from)?.neighbors.get(to).copied()
    }

    /// Node closest to a map position. Ties go to the lowest id.
    pub fn nearest_node(&self, point: &Point2D) -> Option<&GraphNode> {
        let mut best: Option<(&GraphNode, f32)> = None;
        for node in self.nodes.values() {
            let d = node.position.distance_squared(point);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((node, d)),
            }
        }
        best.map(|(node, _)| node)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.neighbors.len()).sum()
    }
}

fn check_weight(from: &str, to: &str, weight: f32) -> Result<(), GraphError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidWeight {
            from: from.to_string(),
            to: to.to_string(),
            weight,
        })
    }
}
