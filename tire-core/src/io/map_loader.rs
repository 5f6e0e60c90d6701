//! Navigation and radio map files.
//!
//! Two JSON documents describe a site:
//!
//! ```text
//! nav map:   {"nodes": [{"id", "x", "y", "name", "audio", "neighbors": {id: dist}}]}
//! radio map: {"fingerprints": [{"rp_id", "x", "y", "signals": {beacon: rssi}}]}
//! ```
//!
//! `name` defaults to the node id and `audio` to no announcement. Neighbor
//! entries are directed edges; the map authoring tools write both directions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::algorithms::localization::{RadioMap, RpFingerprint};
use crate::core::types::Point2D;
use crate::error::Result;
use crate::navigation::{GraphNode, NavigationGraph};

#[derive(Debug, Serialize, Deserialize)]
struct NavMapFile {
    nodes: Vec<NodeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: String,
    x: f32,
    y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    audio: String,
    #[serde(default)]
    neighbors: BTreeMap<String, f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RadioMapFile {
    fingerprints: Vec<FingerprintRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FingerprintRecord {
    rp_id: String,
    x: f32,
    y: f32,
    #[serde(default)]
    signals: BTreeMap<String, f32>,
}

impl From<NodeRecord> for GraphNode {
    fn from(record: NodeRecord) -> Self {
        let mut node = GraphNode::new(record.id, record.x, record.y).with_audio(record.audio);
        if let Some(name) = record.name {
            node = node.with_name(name);
        }
        node.neighbors = record.neighbors;
        node
    }
}

impl From<&GraphNode> for NodeRecord {
    fn from(node: &GraphNode) -> Self {
        Self {
            id: node.id.clone(),
            x: node.position.x,
            y: node.position.y,
            name: Some(node.display_name.clone()),
            audio: node.audio_cue.clone(),
            neighbors: node.neighbors.clone(),
        }
    }
}

impl From<FingerprintRecord> for RpFingerprint {
    fn from(record: FingerprintRecord) -> Self {
        Self {
            rp_id: record.rp_id,
            position: Point2D::new(record.x, record.y),
            signal_strengths: record.signals,
        }
    }
}

impl From<&RpFingerprint> for FingerprintRecord {
    fn from(fp: &RpFingerprint) -> Self {
        Self {
            rp_id: fp.rp_id.clone(),
            x: fp.position.x,
            y: fp.position.y,
            signals: fp.signal_strengths.clone(),
        }
    }
}

/// Parse a navigation map document.
pub fn parse_graph(json: &str) -> Result<NavigationGraph> {
    let file: NavMapFile = serde_json::from_str(json)?;
    let graph = NavigationGraph::from_nodes(file.nodes.into_iter().map(GraphNode::from))?;
    Ok(graph)
}

/// Parse a radio map document.
pub fn parse_radio_map(json: &str) -> Result<RadioMap> {
    let file: RadioMapFile = serde_json::from_str(json)?;
    Ok(file.fingerprints.into_iter().map(RpFingerprint::from).collect())
}

/// Load a navigation map from disk.
pub fn load_graph(path: &Path) -> Result<NavigationGraph> {
    let graph = parse_graph(&fs::read_to_string(path)?)?;
    info!(
        "Loaded navigation map {} ({} nodes, {} edges)",
        path.display(),
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Load a radio map from disk.
pub fn load_radio_map(path: &Path) -> Result<RadioMap> {
    let radio_map = parse_radio_map(&fs::read_to_string(path)?)?;
    info!(
        "Loaded radio map {} ({} fingerprints)",
        path.display(),
        radio_map.len()
    );
    Ok(radio_map)
}

/// Write a navigation map as pretty JSON.
pub fn save_graph(graph: &NavigationGraph, path: &Path) -> Result<()> {
    let file = NavMapFile {
        nodes: graph.all_nodes().map(NodeRecord::from).collect(),
    };
    fs::write(path, serde_json::to_string_pretty(&file)?)?;
    info!("Saved navigation map: {}", path.display());
    Ok(())
}

/// Write a radio map as pretty JSON.
pub fn save_radio_map(radio_map: &[RpFingerprint], path: &Path) -> Result<()> {
    let file = RadioMapFile {
        fingerprints: radio_map.iter().map(FingerprintRecord::from).collect(),
    };
    fs::write(path, serde_json::to_string_pretty(&file)?)?;
    info!("Saved radio map: {}", path.display());
    Ok(())
}

/// Node ids of the demo hallway.
pub const HALLWAY_START: &str = "RP_HALLWAY_START";
pub const HALLWAY_MIDDLE: &str = "RP_HALLWAY_MIDDLE";
pub const HALLWAY_END: &str = "RP_HALLWAY_END";

/// Three reference points along a 10 m hallway, three beacons.
///
/// START and END are only connected through MIDDLE.
pub fn demo_hallway() -> Result<(NavigationGraph, RadioMap)> {
    let mut graph = NavigationGraph::new();
    graph.add_node(
        GraphNode::new(HALLWAY_START, 0.0, 0.0)
            .with_name("Start of Hallway")
            .with_audio("guidance_start.wav"),
    )?;
    graph.add_node(
        GraphNode::new(HALLWAY_MIDDLE, 0.0, 5.0)
            .with_name("Middle of Hallway")
            .with_audio("guidance_middle.wav"),
    )?;
    graph.add_node(
        GraphNode::new(HALLWAY_END, 0.0, 10.0)
            .with_name("End of Hallway")
            .with_audio("guidance_end.wav"),
    )?;
    graph.connect(HALLWAY_START, HALLWAY_MIDDLE)?;
    graph.connect(HALLWAY_MIDDLE, HALLWAY_END)?;

    let signals = [
        (HALLWAY_START, [-50.0, -80.0, -90.0]),
        (HALLWAY_MIDDLE, [-65.0, -65.0, -85.0]),
        (HALLWAY_END, [-90.0, -50.0, -80.0]),
    ];
    let mut radio_map = RadioMap::new();
    for (rp_id, rssi) in signals {
        let position = graph
            .get_node(rp_id)
            .map(|node| node.position)
            .unwrap_or_default();
        let fingerprint = RpFingerprint::new(rp_id, position)
            .with_signal("BEACON_ID_1", rssi[0])
            .with_signal("BEACON_ID_2", rssi[1])
            .with_signal("BEACON_ID_3", rssi[2]);
        radio_map.push(fingerprint);
    }

    Ok((graph, radio_map))
}
