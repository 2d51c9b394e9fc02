//! Spatial pruning of a large network against a reference network.

use fixedbitset::FixedBitSet;
use log::info;
use rayon::prelude::*;

use crate::model::RoadNetwork;
use crate::{Error, NodeId};

/// Retention tolerance for pruning, in raw coordinate units.
#[derive(Debug, Clone, Copy)]
pub struct PruneConfig {
    pub tolerance: f64,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self { tolerance: 0.005 }
    }
}

/// Reduce `large` to the nodes lying within `config.tolerance` of at least
/// one node of `reference`; edges survive only when both endpoints do.
///
/// Retained nodes are renumbered densely in their original relative order.
/// The inputs are left untouched and the result is an independent network.
///
/// The retention test uses plain coordinate-space distance: the tolerance
/// band is small enough that lat/lon anisotropy is immaterial at city-block
/// scale, and it keeps the scan cheap. Reference nodes are pre-sorted by
/// latitude so each retention test only walks the band around the bisection
/// insertion point instead of the whole reference set.
pub fn prune(
    large: &RoadNetwork,
    reference: &RoadNetwork,
    config: &PruneConfig,
) -> Result<RoadNetwork, Error> {
    let mut refs: Vec<(f64, f64)> = reference
        .graph
        .node_weights()
        .map(|node| (node.lat(), node.lon()))
        .collect();
    refs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));

    let nodes: Vec<(f64, f64, bool)> = large
        .graph
        .node_weights()
        .map(|node| (node.lat(), node.lon(), node.virtual_intersection))
        .collect();

    let keep: Vec<bool> = nodes
        .par_iter()
        .map(|&(lat, lon, _)| within_band(&refs, lat, lon, config.tolerance))
        .collect();

    let mut retained = FixedBitSet::with_capacity(nodes.len());
    for (index, &kept) in keep.iter().enumerate() {
        if kept {
            retained.insert(index);
        }
    }

    let mut remap: Vec<Option<NodeId>> = vec![None; nodes.len()];
    let mut pruned = RoadNetwork::new();
    for index in retained.ones() {
        let (lat, lon, virtual_intersection) = nodes[index];
        remap[index] = Some(pruned.add_node(lat, lon, virtual_intersection));
    }

    for edge in large.edges() {
        let Some((source, target)) = large.endpoints(edge) else {
            continue;
        };
        let (Some(new_source), Some(new_target)) = (remap[source.index()], remap[target.index()])
        else {
            continue;
        };
        let Some(data) = large.edge(edge) else {
            continue;
        };
        pruned.add_edge(
            new_source,
            new_target,
            data.street.clone(),
            data.two_way,
            data.segments,
        )?;
    }

    info!(
        "pruned network keeps {} of {} nodes and {} of {} edges",
        pruned.node_count(),
        large.node_count(),
        pruned.edge_count(),
        large.edge_count()
    );
    Ok(pruned)
}

/// Two-pointer expansion outward from the bisection insertion point, with
/// early exit once the latitude band is exhausted in a direction.
fn within_band(refs: &[(f64, f64)], lat: f64, lon: f64, tolerance: f64) -> bool {
    let tolerance_sq = tolerance * tolerance;
    let origin = refs.partition_point(|r| r.0 < lat);
    for &(ref_lat, ref_lon) in refs[..origin].iter().rev() {
        if lat - ref_lat > tolerance {
            break;
        }
        let (dlat, dlon) = (lat - ref_lat, lon - ref_lon);
        if dlat * dlat + dlon * dlon <= tolerance_sq {
            return true;
        }
    }
    for &(ref_lat, ref_lon) in &refs[origin..] {
        if ref_lat - lat > tolerance {
            break;
        }
        let (dlat, dlon) = (lat - ref_lat, lon - ref_lon);
        if dlat * dlat + dlon * dlon <= tolerance_sq {
            return true;
        }
    }
    false
}
