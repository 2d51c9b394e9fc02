//! Per-edge resolved attributes and their merge rules.
//!
//! Attributes are written incrementally as external records are processed:
//! write-once-then-merge, never idempotent replacement. The sign field and
//! the survey-sign field are owned by different record streams and follow
//! different conflict rules, so they are kept separate.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use geo::Point;

use crate::EdgeId;
use crate::model::RoadNetwork;

/// Whether a regulatory sign was observed installed on an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignState {
    #[default]
    Unknown,
    No,
    Yes,
    /// Two records disagreed after the state was set; permanent.
    Conflict,
}

impl SignState {
    pub fn as_str(self) -> &'static str {
        match self {
            SignState::Unknown => "unknown",
            SignState::No => "no",
            SignState::Yes => "yes",
            SignState::Conflict => "conflict",
        }
    }
}

impl fmt::Display for SignState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoints of the record that last asserted a value, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordTrace {
    pub from: Point<f64>,
    pub to: Point<f64>,
}

/// Outcome of a sign merge, reported back so callers can keep counters and
/// emit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMerge {
    Applied,
    /// The edge just transitioned into the permanent conflict state.
    NewConflict { previous: SignState },
    /// The edge was already in conflict; the record is ignored.
    AlreadyConflict,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeAttributes {
    /// Sign state asserted by installation records
    pub sign: SignState,
    pub install_date: Option<NaiveDate>,
    pub sign_source: Option<RecordTrace>,
    /// Sign state asserted by speed-limit survey snapshots; owned by the
    /// speed-limit stream and never written by installation records
    pub survey_sign: SignState,
    /// Posted speed limit in mph, 0 = unknown
    pub speed_limit: u16,
    /// Every limit value ever asserted for this edge
    pub asserted_limits: BTreeSet<u16>,
    pub speed_source: Option<RecordTrace>,
}

impl EdgeAttributes {
    /// Merge a sign assertion. The first value sticks; a later differing
    /// value puts the edge into the permanent conflict state, which no
    /// further record can override.
    pub fn merge_sign(
        &mut self,
        value: SignState,
        date: Option<NaiveDate>,
        trace: RecordTrace,
    ) -> SignMerge {
        match self.sign {
            SignState::Conflict => SignMerge::AlreadyConflict,
            SignState::Unknown => {
                self.sign = value;
                self.install_date = date;
                self.sign_source = Some(trace);
                SignMerge::Applied
            }
            current if current == value => {
                if date.is_some() {
                    self.install_date = date;
                }
                self.sign_source = Some(trace);
                SignMerge::Applied
            }
            current => {
                self.sign = SignState::Conflict;
                self.sign_source = Some(trace);
                SignMerge::NewConflict { previous: current }
            }
        }
    }

    /// Merge a survey sign observation. Any positive assertion is permanent;
    /// a negative one only fills an unknown.
    pub fn merge_survey_sign(&mut self, observed: SignState) {
        match (self.survey_sign, observed) {
            (SignState::Unknown, value) => self.survey_sign = value,
            (_, SignState::Yes) => self.survey_sign = SignState::Yes,
            _ => {}
        }
    }

    /// Merge an asserted posted limit: record every value, keep the
    /// pointwise maximum as the summary limit.
    pub fn merge_speed(&mut self, mph: u16, trace: RecordTrace) {
        self.asserted_limits.insert(mph);
        if mph > self.speed_limit {
            self.speed_limit = mph;
            self.speed_source = Some(trace);
        }
    }

    /// Effective sign state for reporting: installation records win over
    /// survey snapshots.
    pub fn effective_sign(&self) -> SignState {
        if self.sign == SignState::Unknown {
            self.survey_sign
        } else {
            self.sign
        }
    }
}

/// One [`EdgeAttributes`] slot per edge of a network, attached by edge id.
#[derive(Debug, Clone)]
pub struct NetworkAttributes {
    slots: Vec<EdgeAttributes>,
}

impl NetworkAttributes {
    pub fn for_network(network: &RoadNetwork) -> Self {
        Self {
            slots: vec![EdgeAttributes::default(); network.edge_count()],
        }
    }

    /// Edge ids must come from the network this set was built for.
    pub fn get(&self, edge: EdgeId) -> &EdgeAttributes {
        &self.slots[edge.index()]
    }

    pub fn get_mut(&mut self, edge: EdgeId) -> &mut EdgeAttributes {
        &mut self.slots[edge.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeAttributes> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace() -> RecordTrace {
        RecordTrace {
            from: Point::new(-73.0, 40.0),
            to: Point::new(-73.0, 40.1),
        }
    }

    #[test]
    fn sign_conflict_is_absorbing() {
        let mut attrs = EdgeAttributes::default();
        assert_eq!(
            attrs.merge_sign(SignState::No, None, trace()),
            SignMerge::Applied
        );
        assert_eq!(
            attrs.merge_sign(SignState::Yes, None, trace()),
            SignMerge::NewConflict {
                previous: SignState::No
            }
        );
        assert_eq!(attrs.sign, SignState::Conflict);
        // A third contradictory record leaves the state untouched.
        assert_eq!(
            attrs.merge_sign(SignState::Yes, None, trace()),
            SignMerge::AlreadyConflict
        );
        assert_eq!(attrs.sign, SignState::Conflict);
    }

    #[test]
    fn repeated_equal_sign_is_not_a_conflict() {
        let mut attrs = EdgeAttributes::default();
        attrs.merge_sign(SignState::Yes, None, trace());
        assert_eq!(
            attrs.merge_sign(SignState::Yes, None, trace()),
            SignMerge::Applied
        );
        assert_eq!(attrs.sign, SignState::Yes);
    }

    #[test]
    fn survey_sign_sticks_at_yes() {
        let mut attrs = EdgeAttributes::default();
        attrs.merge_survey_sign(SignState::No);
        assert_eq!(attrs.survey_sign, SignState::No);
        attrs.merge_survey_sign(SignState::Yes);
        assert_eq!(attrs.survey_sign, SignState::Yes);
        attrs.merge_survey_sign(SignState::No);
        assert_eq!(attrs.survey_sign, SignState::Yes);
    }

    #[test]
    fn speed_merge_keeps_the_maximum_and_is_idempotent() {
        let mut attrs = EdgeAttributes::default();
        attrs.merge_speed(25, trace());
        attrs.merge_speed(25, trace());
        assert_eq!(attrs.speed_limit, 25);
        attrs.merge_speed(20, trace());
        assert_eq!(attrs.speed_limit, 25);
        attrs.merge_speed(30, trace());
        assert_eq!(attrs.speed_limit, 30);
        assert_eq!(
            attrs.asserted_limits.iter().copied().collect::<Vec<_>>(),
            vec![20, 25, 30]
        );
    }

    #[test]
    fn effective_sign_prefers_installation_records() {
        let mut attrs = EdgeAttributes::default();
        attrs.merge_survey_sign(SignState::Yes);
        assert_eq!(attrs.effective_sign(), SignState::Yes);
        attrs.merge_sign(SignState::No, None, trace());
        assert_eq!(attrs.effective_sign(), SignState::No);
    }
}
