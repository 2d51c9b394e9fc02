//! Path search over the street graph.

mod street_dijkstra;

pub use street_dijkstra::{PathConfig, PathCost, StreetPath, directional_path, street_aware_path};
