//! I/O and persistence layer.
//!
//! # Contents
//!
//! - [`map_loader`]: Navigation and radio map JSON files

pub mod map_loader;

pub use map_loader::{
    demo_hallway, load_graph, load_radio_map, parse_graph, parse_radio_map, save_graph,
    save_radio_map,
};
