//! Geometric primitives shared by the locator, the path engine and pruning.

use geo::{Contains, Distance, Haversine, LineString, Point, Polygon};

const METERS_PER_MILE: f64 = 1609.344;

/// Great-circle distance between two points, in miles.
pub fn haversine_miles(a: Point<f64>, b: Point<f64>) -> f64 {
    Haversine.distance(a, b) / METERS_PER_MILE
}

/// Straight-line distance in raw coordinate space (degrees).
///
/// Lat/lon degrees are not isometric, so this is only good for picking a
/// candidate cheaply or for tolerances small enough that the distortion does
/// not matter at city-block scale.
pub fn coord_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = a.x() - b.x();
    let dy = a.y() - b.y();
    (dx * dx + dy * dy).sqrt()
}

/// Midpoint of a segment in coordinate space.
pub fn midpoint(a: Point<f64>, b: Point<f64>) -> Point<f64> {
    Point::new((a.x() + b.x()) * 0.5, (a.y() + b.y()) * 0.5)
}

/// A polygonal zone, e.g. a borough or a study area.
#[derive(Debug, Clone)]
pub struct Zone {
    pub id: u32,
    polygon: Polygon<f64>,
}

impl Zone {
    /// Build a zone from its boundary ring of `(lon, lat)` vertices, in
    /// ring order. The ring is closed automatically.
    pub fn new(id: u32, ring: Vec<(f64, f64)>) -> Self {
        Self {
            id,
            polygon: Polygon::new(LineString::from(ring), Vec::new()),
        }
    }

    pub fn contains(&self, point: Point<f64>) -> bool {
        self.polygon.contains(&point)
    }
}

/// Zone collection with linear containment lookup.
#[derive(Debug, Clone, Default)]
pub struct ZoneIndex {
    zones: Vec<Zone>,
}

impl ZoneIndex {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Id of the first zone containing `point`, if any.
    pub fn locate(&self, point: Point<f64>) -> Option<u32> {
        self.zones
            .iter()
            .find(|zone| zone.contains(point))
            .map(|zone| zone.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_69_miles() {
        let a = Point::new(-73.0, 40.0);
        let b = Point::new(-73.0, 41.0);
        let miles = haversine_miles(a, b);
        assert!((miles - 69.1).abs() < 0.2, "got {miles}");
    }

    #[test]
    fn coord_distance_is_plain_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((coord_distance(a, b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zone_lookup_hits_the_containing_polygon() {
        let zones = ZoneIndex::new(vec![
            Zone::new(3, vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            Zone::new(7, vec![(2.0, 0.0), (3.0, 0.0), (3.0, 1.0), (2.0, 1.0)]),
        ]);
        assert_eq!(zones.locate(Point::new(0.5, 0.5)), Some(3));
        assert_eq!(zones.locate(Point::new(2.5, 0.5)), Some(7));
        assert_eq!(zones.locate(Point::new(1.5, 0.5)), None);
    }
}
