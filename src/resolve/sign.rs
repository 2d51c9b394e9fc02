//! Sign-installation records.

use geo::Point;
use log::{info, warn};

use super::{Resolution, resolve_targets};
use crate::loading::{RawSignRecord, SignRecord};
use crate::model::{LocatorConfig, NetworkAttributes, RecordTrace, RoadNetwork, SignMerge};
use crate::routing::PathConfig;

/// Counters reported to the caller after a sign resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignSummary {
    pub total: usize,
    pub applied: usize,
    pub outside_coverage: usize,
    pub unresolved: usize,
    /// Edges newly marked conflict during this pass
    pub conflicts: usize,
}

/// Match raw survey endpoints onto network nodes, producing the processed
/// record form the apply pass and the CSV re-export consume. Endpoints with
/// no intersection within tolerance come out as `None`.
pub fn match_sign_endpoints(
    network: &RoadNetwork,
    records: &[RawSignRecord],
    config: &LocatorConfig,
) -> Vec<SignRecord> {
    records
        .iter()
        .map(|raw| SignRecord {
            source: network.nearest_node(Point::new(raw.from_x, raw.from_y), config),
            target: network.nearest_node(Point::new(raw.to_x, raw.to_y), config),
            from_lat: raw.from_y,
            from_lon: raw.from_x,
            to_lat: raw.to_y,
            to_lon: raw.to_x,
            date_inst: raw.date_inst,
        })
        .collect()
}

/// Apply endpoint-matched sign records to the attribute set.
///
/// Sign records carry no street name, so path resolution runs without a
/// continuity hint and in the recorded direction only.
pub fn apply_sign_records(
    network: &RoadNetwork,
    attrs: &mut NetworkAttributes,
    records: &[SignRecord],
    config: &PathConfig,
) -> SignSummary {
    let mut summary = SignSummary {
        total: records.len(),
        ..SignSummary::default()
    };

    for record in records {
        match resolve_targets(network, record.source, record.target, None, false, config) {
            Resolution::OutsideCoverage => summary.outside_coverage += 1,
            Resolution::NoPath => summary.unresolved += 1,
            Resolution::Edges(edges) => {
                summary.applied += 1;
                let value = record.asserted_sign();
                let trace = RecordTrace {
                    from: record.from_point(),
                    to: record.to_point(),
                };
                for edge in edges {
                    let previous_source = attrs.get(edge).sign_source;
                    match attrs.get_mut(edge).merge_sign(value, record.date_inst, trace) {
                        SignMerge::Applied | SignMerge::AlreadyConflict => {}
                        SignMerge::NewConflict { previous } => {
                            summary.conflicts += 1;
                            warn!(
                                "contradiction in sign of edge {edge:?} [{previous} -> {value}]; \
                                 previous record {previous_source:?}, current ({:.6}, {:.6}) -> ({:.6}, {:.6})",
                                record.from_lat, record.from_lon, record.to_lat, record.to_lon
                            );
                        }
                    }
                }
            }
        }
    }

    info!(
        "sign records: {} of {} applied, {} outside coverage, {} unresolved, {} conflicts",
        summary.applied, summary.total, summary.outside_coverage, summary.unresolved,
        summary.conflicts
    );
    summary
}
