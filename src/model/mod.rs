//! Road network data model.

pub mod attributes;
pub mod components;
pub mod network;

pub use attributes::{EdgeAttributes, NetworkAttributes, RecordTrace, SignMerge, SignState};
pub use components::{Edge, Node};
pub use network::{LocatorConfig, RoadNetwork};
