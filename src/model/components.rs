//! Road network components - intersections and directed street segments.

use geo::Point;

/// Street intersection.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node coordinates (x = longitude, y = latitude)
    pub geometry: Point<f64>,
    /// Synthetic intersection introduced by the source survey rather than a
    /// physical one
    pub virtual_intersection: bool,
}

impl Node {
    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    pub fn lon(&self) -> f64 {
        self.geometry.x()
    }
}

/// Directed street segment between two intersections.
///
/// Topology only: resolved survey attributes live in
/// [`NetworkAttributes`](super::NetworkAttributes), attached by edge id, so
/// tests can build topology without fabricating resolution state.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Street name as carried by the source survey, empty when unnamed
    pub street: String,
    /// Both travel directions share this physical segment
    pub two_way: bool,
    /// Number of survey segments collapsed into this edge
    pub segments: u32,
    /// Physical length in miles, derived from endpoint coordinates
    pub length: f64,
}
