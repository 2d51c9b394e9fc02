//! Attribute resolution: mapping external point-pair records onto graph
//! edges and merging their values under per-attribute conflict rules.
//!
//! Each pass is a reducer over the record stream: it mutates the
//! [`NetworkAttributes`](crate::model::NetworkAttributes) set in place and
//! returns aggregate counters to the caller. All failure handling is count
//! and continue.

mod sign;
mod speed;

pub use sign::{SignSummary, apply_sign_records, match_sign_endpoints};
pub use speed::{SpeedSummary, apply_speed_records, match_speed_endpoints};

use log::warn;

use crate::model::RoadNetwork;
use crate::routing::{PathConfig, directional_path, street_aware_path};
use crate::{EdgeId, NodeId};

/// Where a record landed.
pub(crate) enum Resolution {
    /// The edges the record applies to: a direct edge, or a resolved path
    Edges(Vec<EdgeId>),
    /// At least one endpoint has no matching intersection
    OutsideCoverage,
    /// Endpoints matched but no plausible path connects them
    NoPath,
}

/// Map a record's endpoint pair onto the edges it applies to: the direct
/// edge when the endpoints are adjacent, otherwise a street-aware path.
pub(crate) fn resolve_targets(
    network: &RoadNetwork,
    source: Option<NodeId>,
    target: Option<NodeId>,
    street_hint: Option<&str>,
    directional: bool,
    config: &PathConfig,
) -> Resolution {
    let (source, target) = match (source, target) {
        (Some(source), Some(target)) => (source, target),
        (None, None) => return Resolution::OutsideCoverage,
        (source, target) => {
            warn!("only a single endpoint within coverage ({source:?}, {target:?})");
            return Resolution::OutsideCoverage;
        }
    };

    if let Some(edge) = network.direct_edge(source, target) {
        return Resolution::Edges(vec![edge]);
    }

    let path = if directional {
        directional_path(network, source, target, street_hint, config)
    } else {
        street_aware_path(network, source, target, street_hint, config)
    };
    match path {
        Some(path) => Resolution::Edges(path.edges),
        None => Resolution::NoPath,
    }
}
