//! LION-style CSV form: one CSV for nodes, one for edges.
//!
//! Column order is irrelevant; columns are located by header name.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::model::RoadNetwork;
use crate::{Error, NodeId};

#[derive(Debug, Deserialize)]
struct NodeRow {
    lat: f64,
    lon: f64,
    #[serde(rename = "virtual", default)]
    virtual_intersection: u8,
}

#[derive(Debug, Deserialize)]
struct EdgeRow {
    source: usize,
    target: usize,
    // Validated but not kept; lengths are derived from coordinates.
    #[serde(rename = "distance")]
    _distance: f64,
    street: String,
    #[serde(default)]
    two_way: u8,
    #[serde(default = "default_segments")]
    segments: u32,
}

fn default_segments() -> u32 {
    1
}

pub fn load_lion_network(nodes_path: &Path, edges_path: &Path) -> Result<RoadNetwork, Error> {
    read_lion_network(File::open(nodes_path)?, File::open(edges_path)?)
}

pub fn read_lion_network<N: Read, E: Read>(nodes: N, edges: E) -> Result<RoadNetwork, Error> {
    let mut network = RoadNetwork::new();

    let mut reader = csv::Reader::from_reader(nodes);
    for row in reader.deserialize() {
        let row: NodeRow = row?;
        network.add_node(row.lat, row.lon, row.virtual_intersection != 0);
    }

    let mut reader = csv::Reader::from_reader(edges);
    for row in reader.deserialize() {
        let row: EdgeRow = row?;
        network.add_edge(
            NodeId::new(row.source),
            NodeId::new(row.target),
            row.street,
            row.two_way != 0,
            row.segments,
        )?;
    }

    info!(
        "LION network read: {} nodes, {} edges",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}
