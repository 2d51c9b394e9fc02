//! CSV export: network round-trips, processed records and the flat
//! per-edge attribute summary.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use itertools::izip;
use log::info;
use serde::Serialize;

use crate::Error;
use crate::geometry::midpoint;
use crate::loading::{SignRecord, SpeedRecord};
use crate::model::{NetworkAttributes, RoadNetwork, SignState};

#[derive(Debug, Serialize)]
struct NodeRow {
    lat: f64,
    lon: f64,
    #[serde(rename = "virtual")]
    virtual_intersection: u8,
}

#[derive(Debug, Serialize)]
struct EdgeRow<'a> {
    source: usize,
    target: usize,
    distance: f64,
    street: &'a str,
    two_way: u8,
    segments: u32,
}

/// Write the network in the LION CSV layout, suitable for reloading with
/// [`read_lion_network`](crate::loading::read_lion_network).
pub fn write_network_csv<N: Write, E: Write>(
    network: &RoadNetwork,
    nodes: N,
    edges: E,
) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(nodes);
    for node in network.graph.node_weights() {
        writer.serialize(NodeRow {
            lat: node.lat(),
            lon: node.lon(),
            virtual_intersection: u8::from(node.virtual_intersection),
        })?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_writer(edges);
    for edge in network.edges() {
        let Some((source, target)) = network.endpoints(edge) else {
            continue;
        };
        let Some(data) = network.edge(edge) else {
            continue;
        };
        writer.serialize(EdgeRow {
            source: source.index(),
            target: target.index(),
            distance: data.length,
            street: &data.street,
            two_way: u8::from(data.two_way),
            segments: data.segments,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_network_csv(
    network: &RoadNetwork,
    nodes_path: &Path,
    edges_path: &Path,
) -> Result<(), Error> {
    write_network_csv(network, File::create(nodes_path)?, File::create(edges_path)?)
}

/// Write the network in the plain-text clean form, suitable for reloading
/// with [`read_clean_network`](crate::loading::read_clean_network).
pub fn write_clean_network<W: Write>(network: &RoadNetwork, mut out: W) -> Result<(), Error> {
    writeln!(out, "{} {}", network.node_count(), network.edge_count())?;
    for node in network.graph.node_weights() {
        writeln!(out, "{:.6} {:.6}", node.lat(), node.lon())?;
    }
    for edge in network.edges() {
        let Some((source, target)) = network.endpoints(edge) else {
            continue;
        };
        let Some(data) = network.edge(edge) else {
            continue;
        };
        writeln!(out, "{} {} {:.6}", source.index(), target.index(), data.length)?;
    }
    Ok(())
}

/// Re-export endpoint-matched sign records.
pub fn write_sign_records<W: Write>(records: &[SignRecord], out: W) -> Result<(), Error> {
    write_serialized(records, out)
}

pub fn save_sign_records(records: &[SignRecord], path: &Path) -> Result<(), Error> {
    write_sign_records(records, File::create(path)?)
}

/// Re-export endpoint-matched speed-limit records.
pub fn write_speed_records<W: Write>(records: &[SpeedRecord], out: W) -> Result<(), Error> {
    write_serialized(records, out)
}

pub fn save_speed_records(records: &[SpeedRecord], path: &Path) -> Result<(), Error> {
    write_speed_records(records, File::create(path)?)
}

fn write_serialized<W: Write, T: Serialize>(rows: &[T], out: W) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    mid_lat: f64,
    mid_lon: f64,
    speed_limit: u16,
    sign: &'a str,
}

/// Flat per-edge summary of resolved attributes: segment midpoint, resolved
/// limit and sign state. Edges whose sign state is still unknown or
/// permanently conflicted are excluded.
pub fn write_summary_csv<W: Write>(
    network: &RoadNetwork,
    attrs: &NetworkAttributes,
    out: W,
) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(out);
    let mut written = 0usize;
    for (edge, slot) in izip!(network.edges(), attrs.iter()) {
        let sign = slot.effective_sign();
        if matches!(sign, SignState::Unknown | SignState::Conflict) {
            continue;
        }
        let Some((source, target)) = network.endpoints(edge) else {
            continue;
        };
        let mid = midpoint(network.graph[source].geometry, network.graph[target].geometry);
        writer.serialize(SummaryRow {
            mid_lat: mid.y(),
            mid_lon: mid.x(),
            speed_limit: slot.speed_limit,
            sign: sign.as_str(),
        })?;
        written += 1;
    }
    writer.flush()?;
    info!("summary export: {written} of {} edges", network.edge_count());
    Ok(())
}

pub fn save_summary_csv(
    network: &RoadNetwork,
    attrs: &NetworkAttributes,
    path: &Path,
) -> Result<(), Error> {
    write_summary_csv(network, attrs, File::create(path)?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::NodeId;
    use crate::loading::read_lion_network;
    use crate::model::RecordTrace;

    fn sample_network() -> RoadNetwork {
        let mut network = RoadNetwork::new();
        let a = network.add_node(40.000, -73.000, false);
        let b = network.add_node(40.010, -73.000, true);
        network.add_edge(a, b, "Broadway".into(), true, 2).unwrap();
        network.add_edge(b, a, "Broadway".into(), true, 2).unwrap();
        network
    }

    #[test]
    fn lion_round_trip_preserves_topology() {
        let network = sample_network();
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        write_network_csv(&network, &mut nodes, &mut edges).unwrap();

        let reloaded = read_lion_network(Cursor::new(nodes), Cursor::new(edges)).unwrap();
        assert_eq!(reloaded.node_count(), network.node_count());
        assert_eq!(reloaded.edge_count(), network.edge_count());
        assert!(reloaded.node(NodeId::new(1)).unwrap().virtual_intersection);
        let edge = reloaded
            .edge(reloaded.direct_edge(NodeId::new(0), NodeId::new(1)).unwrap())
            .unwrap();
        assert_eq!(edge.street, "Broadway");
        assert!(edge.two_way);
        assert_eq!(edge.segments, 2);
    }

    #[test]
    fn clean_export_matches_the_declared_format() {
        let network = sample_network();
        let mut out = Vec::new();
        write_clean_network(&network, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("2 2"));
        assert_eq!(lines.next(), Some("40.000000 -73.000000"));
        assert_eq!(lines.next(), Some("40.010000 -73.000000"));
        assert!(lines.next().unwrap().starts_with("0 1 "));
    }

    #[test]
    fn summary_skips_unknown_and_conflict_edges() {
        let network = sample_network();
        let mut attrs = NetworkAttributes::for_network(&network);
        let trace = RecordTrace {
            from: geo::Point::new(-73.0, 40.0),
            to: geo::Point::new(-73.0, 40.01),
        };
        let signed = network.direct_edge(NodeId::new(0), NodeId::new(1)).unwrap();
        attrs.get_mut(signed).merge_sign(SignState::Yes, None, trace);
        attrs.get_mut(signed).merge_speed(25, trace);
        // The reverse edge stays unknown and must not be exported.

        let mut out = Vec::new();
        write_summary_csv(&network, &attrs, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2, "header plus one row: {text}");
        assert_eq!(lines[0], "mid_lat,mid_lon,speed_limit,sign");
        assert_eq!(lines[1], "40.005,-73.0,25,yes");
    }
}
