//! Plain-text "clean network" form.
//!
//! A `<node_count> <edge_count>` header line, then one `<lat> <lon>` line
//! per node and one `<source> <target> <distance>` line per edge.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::model::RoadNetwork;
use crate::{Error, NodeId};

pub fn load_clean_network(path: &Path) -> Result<RoadNetwork, Error> {
    read_clean_network(BufReader::new(File::open(path)?))
}

pub fn read_clean_network<R: BufRead>(reader: R) -> Result<RoadNetwork, Error> {
    let mut lines = reader.lines();

    let header = next_line(&mut lines)?;
    let mut fields = header.split_whitespace();
    let node_count: usize = parse_field(fields.next(), &header)?;
    let edge_count: usize = parse_field(fields.next(), &header)?;

    let mut network = RoadNetwork::new();
    for _ in 0..node_count {
        let line = next_line(&mut lines)?;
        let mut fields = line.split_whitespace();
        let lat: f64 = parse_field(fields.next(), &line)?;
        let lon: f64 = parse_field(fields.next(), &line)?;
        network.add_node(lat, lon, false);
    }
    for _ in 0..edge_count {
        let line = next_line(&mut lines)?;
        let mut fields = line.split_whitespace();
        let source: usize = parse_field(fields.next(), &line)?;
        let target: usize = parse_field(fields.next(), &line)?;
        // The declared distance is validated but not kept: edge lengths are
        // derived from the endpoint coordinates.
        let _declared: f64 = parse_field(fields.next(), &line)?;
        network.add_edge(NodeId::new(source), NodeId::new(target), String::new(), false, 1)?;
    }

    info!("clean network read: {node_count} nodes, {edge_count} edges");
    Ok(network)
}

fn next_line(lines: &mut impl Iterator<Item = std::io::Result<String>>) -> Result<String, Error> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(Error::InvalidData(
            "unexpected end of network file".to_string(),
        )),
    }
}

fn parse_field<T: FromStr>(field: Option<&str>, line: &str) -> Result<T, Error> {
    field
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| Error::InvalidData(format!("malformed network line {line:?}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const SMALL: &str = "3 2\n40.000 -73.000\n40.010 -73.000\n40.010 -73.010\n0 1 0.7\n1 2 0.5\n";

    #[test]
    fn reads_nodes_and_edges_in_declared_order() {
        let network = read_clean_network(Cursor::new(SMALL)).unwrap();
        assert_eq!(network.node_count(), 3);
        assert_eq!(network.edge_count(), 2);
        assert!(
            network
                .direct_edge(NodeId::new(0), NodeId::new(1))
                .is_some()
        );
        // Length comes from the coordinates, not the declared 0.7.
        let edge = network
            .edge(network.direct_edge(NodeId::new(0), NodeId::new(1)).unwrap())
            .unwrap();
        assert!((edge.length - 0.69).abs() < 0.01, "got {}", edge.length);
    }

    #[test]
    fn truncated_input_is_a_hard_stop() {
        let err = read_clean_network(Cursor::new("2 1\n40.0 -73.0\n")).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn malformed_line_is_a_hard_stop() {
        let err =
            read_clean_network(Cursor::new("1 0\nforty -73.0\n")).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn out_of_range_endpoint_is_rejected() {
        let err = read_clean_network(Cursor::new("1 1\n40.0 -73.0\n0 5 1.0\n")).unwrap_err();
        assert!(matches!(err, Error::InvalidNodeIndex));
    }
}
