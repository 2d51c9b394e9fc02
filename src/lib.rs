//! Street-graph model and street-aware resolution of survey records.
//!
//! `lionnet` represents a city street network as a directed graph of
//! intersections and road segments, matches external point-pair survey
//! records (sign installations, speed-limit surveys) onto graph edges with a
//! shortest-path search biased toward street continuity, and can reduce a
//! large network to the subset geographically relevant to a smaller
//! reference network.
//!
//! The crate is a library: command-line drivers supply file paths, call into
//! [`loading`], [`resolve`] and [`export`], and print the returned summaries.

pub mod algo;
pub mod error;
pub mod export;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod resolve;
pub mod routing;

pub use error::Error;

/// Dense 0-based node id within a [`model::RoadNetwork`].
pub type NodeId = petgraph::graph::NodeIndex;

/// Dense 0-based edge id within a [`model::RoadNetwork`].
pub type EdgeId = petgraph::graph::EdgeIndex;
