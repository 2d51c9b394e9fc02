//! Owning road-network aggregate and nearest-intersection lookup.

use geo::Point;
use hashbrown::HashMap;
use log::trace;
use petgraph::graph::DiGraph;

use crate::geometry::{coord_distance, haversine_miles};
use crate::model::{Edge, Node};
use crate::{EdgeId, Error, NodeId};

/// Matching tolerance for the nearest-intersection lookup.
#[derive(Debug, Clone, Copy)]
pub struct LocatorConfig {
    /// Maximum verified great-circle distance for a match, in miles
    pub tolerance_miles: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            tolerance_miles: 0.1,
        }
    }
}

/// Directed street graph with an exact (source, target) edge index.
///
/// Nodes and edges are created once at construction time and never deleted;
/// node ids stay contiguous for the lifetime of an instance. Pruning builds
/// a new network instead of mutating one.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    pub graph: DiGraph<Node, Edge>,
    edge_index: HashMap<(NodeId, NodeId), EdgeId>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            edge_index: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, lat: f64, lon: f64, virtual_intersection: bool) -> NodeId {
        self.graph.add_node(Node {
            geometry: Point::new(lon, lat),
            virtual_intersection,
        })
    }

    /// Insert a directed edge. The physical length is derived from the
    /// endpoint coordinates, not taken from the caller.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        street: String,
        two_way: bool,
        segments: u32,
    ) -> Result<EdgeId, Error> {
        let (a, b) = match (self.graph.node_weight(source), self.graph.node_weight(target)) {
            (Some(s), Some(t)) => (s.geometry, t.geometry),
            _ => return Err(Error::InvalidNodeIndex),
        };
        let edge = self.graph.add_edge(
            source,
            target,
            Edge {
                street,
                two_way,
                segments,
                length: haversine_miles(a, b),
            },
        );
        self.edge_index.insert((source, target), edge);
        Ok(edge)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node_weight(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.graph.edge_weight(id)
    }

    /// Endpoints of an edge as (source, target).
    pub fn endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.graph.edge_endpoints(id)
    }

    /// O(1) direct-adjacency lookup.
    pub fn direct_edge(&self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.edge_index.get(&(source, target)).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices()
    }

    /// Nearest intersection to `point`, bounded by the locator tolerance.
    ///
    /// A cheap coordinate-space scan picks the candidate; the candidate is
    /// then verified against the tolerance with true great-circle distance,
    /// since lat/lon degrees are not isometric. The scan is linear over all
    /// nodes, which is fine for the handful of external records it runs for.
    /// Equidistant candidates resolve to the first in insertion order.
    pub fn nearest_node(&self, point: Point<f64>, config: &LocatorConfig) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for id in self.graph.node_indices() {
            let dist = coord_distance(point, self.graph[id].geometry);
            match best {
                Some((_, found)) if dist >= found => {}
                _ => best = Some((id, dist)),
            }
        }
        let (candidate, _) = best?;
        let verified = haversine_miles(point, self.graph[candidate].geometry);
        if verified > config.tolerance_miles {
            trace!(
                "no intersection within {} mi of {:?} (nearest is {:.3} mi away)",
                config.tolerance_miles, point, verified
            );
            return None;
        }
        Some(candidate)
    }
}

impl Default for RoadNetwork {
    fn default() -> Self {
        Self::new()
    }
}
