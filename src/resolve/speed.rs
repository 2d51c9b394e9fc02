//! Speed-limit survey records.

use geo::Point;
use log::info;

use super::{Resolution, resolve_targets};
use crate::loading::{RawSpeedRecord, SpeedRecord};
use crate::model::{LocatorConfig, NetworkAttributes, RecordTrace, RoadNetwork};
use crate::routing::PathConfig;

/// Counters reported to the caller after a speed-limit resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeedSummary {
    pub total: usize,
    pub applied: usize,
    pub outside_coverage: usize,
    pub unresolved: usize,
    /// Records whose snapshots never saw a sign
    pub not_installed: usize,
    /// Records whose snapshots disagree: a sign appeared mid-survey
    pub newly_installed: usize,
    /// Records with a sign present in every snapshot
    pub fully_installed: usize,
}

/// Match raw survey endpoints onto network nodes, producing the processed
/// record form the apply pass and the CSV re-export consume.
pub fn match_speed_endpoints(
    network: &RoadNetwork,
    records: &[RawSpeedRecord],
    config: &LocatorConfig,
) -> Vec<SpeedRecord> {
    records
        .iter()
        .map(|raw| SpeedRecord {
            source: network.nearest_node(Point::new(raw.start_x, raw.start_y), config),
            target: network.nearest_node(Point::new(raw.end_x, raw.end_y), config),
            from_lat: raw.start_y,
            from_lon: raw.start_x,
            to_lat: raw.end_y,
            to_lon: raw.end_x,
            sign_2014: raw.sign_2014,
            sign_2015: raw.sign_2015,
            sign_post_vz: raw.sign_post_vz,
            posted_limit: raw.posted_limit,
            street: raw.street.clone(),
        })
        .collect()
}

/// Apply endpoint-matched speed-limit records to the attribute set.
///
/// Surveys may record a segment against the reverse direction of a one-way
/// or divided street, so path resolution uses the directional variant with
/// the record's own street as the continuity hint. Survey sign snapshots
/// merge under the sticky-yes rule; posted limits merge as the pointwise
/// maximum of everything asserted.
pub fn apply_speed_records(
    network: &RoadNetwork,
    attrs: &mut NetworkAttributes,
    records: &[SpeedRecord],
    config: &PathConfig,
) -> SpeedSummary {
    let mut summary = SpeedSummary {
        total: records.len(),
        ..SpeedSummary::default()
    };

    for record in records {
        // Snapshot bookkeeping is per record, before endpoint matching,
        // mirroring how the survey reports installation progress.
        let snapshots = record.snapshots();
        let any = snapshots.into_iter().any(|seen| seen);
        let all = snapshots.into_iter().all(|seen| seen);
        if all {
            summary.fully_installed += 1;
        }
        if any != all {
            summary.newly_installed += 1;
        }
        if !any {
            summary.not_installed += 1;
        }

        match resolve_targets(
            network,
            record.source,
            record.target,
            record.street_hint(),
            true,
            config,
        ) {
            Resolution::OutsideCoverage => summary.outside_coverage += 1,
            Resolution::NoPath => summary.unresolved += 1,
            Resolution::Edges(edges) => {
                summary.applied += 1;
                let observed = record.observed_sign();
                let trace = RecordTrace {
                    from: record.from_point(),
                    to: record.to_point(),
                };
                for edge in edges {
                    let slot = attrs.get_mut(edge);
                    slot.merge_survey_sign(observed);
                    if record.posted_limit > 0 {
                        slot.merge_speed(record.posted_limit, trace);
                    }
                }
            }
        }
    }

    info!(
        "speed records: {} of {} applied, {} outside coverage, {} unresolved; \
         signs never {}, newly {}, fully {}",
        summary.applied,
        summary.total,
        summary.outside_coverage,
        summary.unresolved,
        summary.not_installed,
        summary.newly_installed,
        summary.fully_installed
    );
    summary
}
