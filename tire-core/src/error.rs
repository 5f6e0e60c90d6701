//! Error types for map construction and loading.
//!
//! The runtime algorithms never fail with an error: absent data yields
//! `None` or an empty route. Errors only arise while building or reading maps.

use thiserror::Error;

/// Graph construction errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    #[error("Invalid edge weight {weight} on {from} -> {to}")]
    InvalidWeight { from: String, to: String, weight: f32 },
}

/// Map file errors.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed map file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, MapError>;
