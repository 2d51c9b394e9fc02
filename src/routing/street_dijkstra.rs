//! Street-aware shortest path.
//!
//! Dijkstra-style search over (node, last street) states with a
//! lexicographic cost: fewer street changes always wins, total distance only
//! breaks ties. External point-pair records most plausibly lie on a single
//! contiguous street corridor, which is what the bias encodes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use log::{trace, warn};
use petgraph::visit::EdgeRef;

use crate::geometry::haversine_miles;
use crate::model::RoadNetwork;
use crate::{EdgeId, NodeId};

/// Tuning knobs for the path engine.
#[derive(Debug, Clone, Copy)]
pub struct PathConfig {
    /// Cost added whenever a step leaves the street it arrived on
    pub street_change_penalty: u32,
    /// Reject a found path whose length exceeds the straight-line
    /// source-target distance by more than this many miles
    pub plausibility_slack_miles: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            street_change_penalty: 1,
            plausibility_slack_miles: 3.0,
        }
    }
}

/// Accumulated search cost: (street changes, miles), compared
/// lexicographically.
#[derive(Debug, Clone, Copy)]
pub struct PathCost {
    pub street_changes: u32,
    pub distance: f64,
}

impl PathCost {
    const ZERO: Self = Self {
        street_changes: 0,
        distance: 0.0,
    };
}

impl PartialEq for PathCost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathCost {}

impl Ord for PathCost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.street_changes
            .cmp(&other.street_changes)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}

impl PartialOrd for PathCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A resolved source→target edge path.
#[derive(Debug, Clone)]
pub struct StreetPath {
    /// Edges in source→target order
    pub edges: Vec<EdgeId>,
    pub cost: PathCost,
}

/// Search state: the node reached and the street used to reach it (`None`
/// is the sentinel for the source, or the caller's street hint).
type SearchState<'a> = (NodeId, Option<&'a str>);

#[derive(Clone, Copy, PartialEq, Eq)]
struct QueueEntry<'a> {
    cost: PathCost,
    node: NodeId,
    street: Option<&'a str>,
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap); ties
        // broken on node and street to keep Ord consistent with PartialEq.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.node.index().cmp(&other.node.index()))
            .then_with(|| self.street.cmp(&other.street))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Minimum-cost path from `source` to `target`.
///
/// `street_hint` seeds the last-street state, so the first step onto the
/// hinted street does not pay the change penalty. The search returns on the
/// first pop of any state at the target node; a cheaper state with a
/// different street history may remain unexplored. Downstream outputs were
/// tuned against that behavior, so it is kept as is.
///
/// Returns `None` when the target is unreachable or the found path fails
/// the geographic plausibility gate.
pub fn street_aware_path(
    network: &RoadNetwork,
    source: NodeId,
    target: NodeId,
    street_hint: Option<&str>,
    config: &PathConfig,
) -> Option<StreetPath> {
    if source == target {
        return None;
    }
    network.node(source)?;
    network.node(target)?;

    let graph = &network.graph;
    let mut best: HashMap<SearchState<'_>, PathCost> = HashMap::new();
    let mut prev: HashMap<SearchState<'_>, (SearchState<'_>, EdgeId)> = HashMap::new();
    let mut heap = BinaryHeap::new();

    best.insert((source, street_hint), PathCost::ZERO);
    heap.push(QueueEntry {
        cost: PathCost::ZERO,
        node: source,
        street: street_hint,
    });

    while let Some(QueueEntry { cost, node, street }) = heap.pop() {
        if node == target {
            return finish(network, source, (node, street), cost, &prev, config);
        }
        if let Some(&found) = best.get(&(node, street)) {
            if cost > found {
                continue;
            }
        }
        for edge in graph.edges(node) {
            let data = edge.weight();
            let next_street = Some(data.street.as_str());
            let penalty = if next_street == street {
                0
            } else {
                config.street_change_penalty
            };
            let next_cost = PathCost {
                street_changes: cost.street_changes + penalty,
                distance: cost.distance + data.length,
            };
            let next_state = (edge.target(), next_street);
            match best.entry(next_state) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    prev.insert(next_state, ((node, street), edge.id()));
                    heap.push(QueueEntry {
                        cost: next_cost,
                        node: edge.target(),
                        street: next_street,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        prev.insert(next_state, ((node, street), edge.id()));
                        heap.push(QueueEntry {
                            cost: next_cost,
                            node: edge.target(),
                            street: next_street,
                        });
                    }
                }
            }
        }
    }

    trace!("no path from {source:?} to {target:?}");
    None
}

/// Plausibility gate and path reconstruction for a popped target state.
fn finish(
    network: &RoadNetwork,
    source: NodeId,
    final_state: SearchState<'_>,
    cost: PathCost,
    prev: &HashMap<SearchState<'_>, (SearchState<'_>, EdgeId)>,
    config: &PathConfig,
) -> Option<StreetPath> {
    let straight = haversine_miles(
        network.graph[source].geometry,
        network.graph[final_state.0].geometry,
    );
    if cost.distance - straight > config.plausibility_slack_miles {
        warn!(
            "discarding implausible path from {source:?} to {:?}: {:.2} mi against a {straight:.2} mi straight line",
            final_state.0, cost.distance
        );
        return None;
    }

    let mut edges = Vec::new();
    let mut state = final_state;
    while let Some(&(parent, edge)) = prev.get(&state) {
        edges.push(edge);
        state = parent;
    }
    edges.reverse();
    Some(StreetPath { edges, cost })
}

/// Directional variant for survey data that may be recorded against the
/// reverse direction of a one-way or divided street: try both directions
/// with the same hint and keep the shorter successful result by physical
/// length (not lexicographic cost). Forward wins ties.
pub fn directional_path(
    network: &RoadNetwork,
    source: NodeId,
    target: NodeId,
    street_hint: Option<&str>,
    config: &PathConfig,
) -> Option<StreetPath> {
    let forward = street_aware_path(network, source, target, street_hint, config);
    let backward = street_aware_path(network, target, source, street_hint, config);
    match (forward, backward) {
        (Some(f), Some(b)) => Some(if b.cost.distance < f.cost.distance { b } else { f }),
        (forward, backward) => forward.or(backward),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_with(
        nodes: &[(f64, f64)],
        edges: &[(usize, usize, &str)],
    ) -> (RoadNetwork, Vec<EdgeId>) {
        let mut network = RoadNetwork::new();
        for &(lat, lon) in nodes {
            network.add_node(lat, lon, false);
        }
        let ids = edges
            .iter()
            .map(|&(s, t, street)| {
                network
                    .add_edge(NodeId::new(s), NodeId::new(t), street.into(), false, 1)
                    .unwrap()
            })
            .collect();
        (network, ids)
    }

    #[test]
    fn single_edge_graph_resolves_to_that_edge() {
        let (network, edges) = network_with(
            &[(40.000, -73.000), (40.010, -73.000)],
            &[(0, 1, "Broadway")],
        );
        let path = street_aware_path(
            &network,
            NodeId::new(0),
            NodeId::new(1),
            Some("Broadway"),
            &PathConfig::default(),
        )
        .unwrap();
        assert_eq!(path.edges, vec![edges[0]]);
        assert_eq!(path.cost.street_changes, 0);

        // Without a matching hint the first step pays the change penalty.
        let unhinted = street_aware_path(
            &network,
            NodeId::new(0),
            NodeId::new(1),
            None,
            &PathConfig::default(),
        )
        .unwrap();
        assert_eq!(unhinted.cost.street_changes, 1);
    }

    #[test]
    fn fewer_street_changes_beat_shorter_distance() {
        // 0 -> 3 stays on one street through a wide bulge via 1, or cuts
        // almost straight through 2 at the price of a second street change.
        let (network, edges) = network_with(
            &[
                (40.000, -73.000),
                (40.005, -73.010),
                (40.005, -73.001),
                (40.010, -73.000),
            ],
            &[
                (0, 1, "Single St"),
                (1, 3, "Single St"),
                (0, 2, "Cross A"),
                (2, 3, "Cross B"),
            ],
        );
        let path = street_aware_path(
            &network,
            NodeId::new(0),
            NodeId::new(3),
            None,
            &PathConfig::default(),
        )
        .unwrap();
        assert_eq!(path.edges, vec![edges[0], edges[1]]);
        assert_eq!(path.cost.street_changes, 1);
    }

    #[test]
    fn equal_street_changes_fall_back_to_distance() {
        // Two single-street routes from 0 to 3; the one through 1 is shorter.
        let (network, edges) = network_with(
            &[
                (40.000, -73.000),
                (40.002, -73.001),
                (40.002, -73.010),
                (40.004, -73.000),
            ],
            &[
                (0, 1, "Near St"),
                (1, 3, "Near St"),
                (0, 2, "Far St"),
                (2, 3, "Far St"),
            ],
        );
        let path = street_aware_path(
            &network,
            NodeId::new(0),
            NodeId::new(3),
            None,
            &PathConfig::default(),
        )
        .unwrap();
        assert_eq!(path.edges, vec![edges[0], edges[1]]);
    }

    #[test]
    fn unreachable_target_is_no_path() {
        let (network, _) = network_with(
            &[(40.000, -73.000), (40.010, -73.000)],
            &[(1, 0, "One Way")],
        );
        assert!(
            street_aware_path(
                &network,
                NodeId::new(0),
                NodeId::new(1),
                None,
                &PathConfig::default(),
            )
            .is_none()
        );
    }

    #[test]
    fn geographically_implausible_path_is_discarded() {
        // Endpoints a block apart, but the only route detours through a node
        // far away: several miles of extra distance against a slack of 3.
        let (network, _) = network_with(
            &[(40.000, -73.000), (40.001, -73.000), (40.050, -73.000)],
            &[(0, 2, "Detour"), (2, 1, "Detour")],
        );
        let config = PathConfig::default();
        assert!(
            street_aware_path(&network, NodeId::new(0), NodeId::new(1), None, &config).is_none()
        );
        // A generous slack accepts the same route.
        let loose = PathConfig {
            plausibility_slack_miles: 50.0,
            ..config
        };
        assert!(
            street_aware_path(&network, NodeId::new(0), NodeId::new(1), None, &loose).is_some()
        );
    }

    #[test]
    fn directional_uses_the_only_passable_direction() {
        let (network, edges) = network_with(
            &[(40.000, -73.000), (40.010, -73.000)],
            &[(0, 1, "North Ave")],
        );
        // 1 -> 0 has no forward path; the reverse one is used.
        let path = directional_path(
            &network,
            NodeId::new(1),
            NodeId::new(0),
            Some("North Ave"),
            &PathConfig::default(),
        )
        .unwrap();
        assert_eq!(path.edges, vec![edges[0]]);
    }

    #[test]
    fn directional_prefers_the_shorter_direction() {
        // Forward 0->2 detours through 1; backward 2->0 is direct and
        // shorter.
        let (network, edges) = network_with(
            &[(40.000, -73.000), (40.005, -73.005), (40.008, -73.000)],
            &[(0, 1, "Loop Rd"), (1, 2, "Loop Rd"), (2, 0, "Loop Rd")],
        );
        let path = directional_path(
            &network,
            NodeId::new(0),
            NodeId::new(2),
            Some("Loop Rd"),
            &PathConfig::default(),
        )
        .unwrap();
        assert_eq!(path.edges, vec![edges[2]]);
    }
}
