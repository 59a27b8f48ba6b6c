//! Nearest-vertex cable path estimate.
//!
//! The path is start -> nearest cable vertex -> nearest cable vertex -> end,
//! each hop a great-circle segment. The cable network itself is never walked:
//! the middle hop is a straight line even when the two vertices lie on
//! different cables.

use crate::geo::{distance_km, GeoPoint, PropagationModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub type CableId = i64;

/// A cable route approximated by an ordered list of vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CablePolyline {
    pub id: CableId,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub geometry: Vec<GeoPoint>,
}

impl CablePolyline {
    /// Single-vertex entries carry no route and are never matched.
    pub fn is_usable(&self) -> bool {
        self.geometry.len() > 1
    }

    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestVertex {
    pub vertex: GeoPoint,
    pub distance_km: f64,
    pub cable_id: CableId,
    pub index: usize,
}

/// Linear scan over every vertex of every usable cable. The first minimum in
/// iteration order wins ties. `None` when no cable has two or more vertices.
pub fn nearest_cable_vertex(point: GeoPoint, cables: &[CablePolyline]) -> Option<NearestVertex> {
    let mut best: Option<NearestVertex> = None;
    let mut min_distance = f64::INFINITY;

    for cable in cables.iter().filter(|c| c.is_usable()) {
        for (index, &vertex) in cable.geometry.iter().enumerate() {
            let d = distance_km(point, vertex);
            if d < min_distance {
                min_distance = d;
                best = Some(NearestVertex {
                    vertex,
                    distance_km: d,
                    cable_id: cable.id,
                    index,
                });
            }
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CablePathEstimate {
    pub start: GeoPoint,
    pub nearest_start_vertex: GeoPoint,
    pub nearest_end_vertex: GeoPoint,
    pub end: GeoPoint,
    pub start_cable_id: CableId,
    pub end_cable_id: CableId,
    pub total_distance_km: f64,
}

impl CablePathEstimate {
    /// Lengths of (start -> cable, cable -> cable, cable -> end) in km.
    pub fn segments(&self) -> [f64; 3] {
        [
            distance_km(self.start, self.nearest_start_vertex),
            distance_km(self.nearest_start_vertex, self.nearest_end_vertex),
            distance_km(self.nearest_end_vertex, self.end),
        ]
    }

    pub fn path(&self) -> [GeoPoint; 4] {
        [
            self.start,
            self.nearest_start_vertex,
            self.nearest_end_vertex,
            self.end,
        ]
    }

    /// RTT over the assembled three-segment distance.
    pub fn latency_ms(&self, model: PropagationModel) -> f64 {
        model.round_trip_ms(self.total_distance_km)
    }
}

pub fn estimate_cable_path(
    start: GeoPoint,
    end: GeoPoint,
    cables: &[CablePolyline],
) -> Option<CablePathEstimate> {
    let (Some(near_start), Some(near_end)) = (
        nearest_cable_vertex(start, cables),
        nearest_cable_vertex(end, cables),
    ) else {
        debug!("no usable cable vertices among {} cables", cables.len());
        return None;
    };

    debug!(
        "nearest cable vertex to start: {} on cable {} ({:.2} km)",
        near_start.vertex, near_start.cable_id, near_start.distance_km
    );
    debug!(
        "nearest cable vertex to end: {} on cable {} ({:.2} km)",
        near_end.vertex, near_end.cable_id, near_end.distance_km
    );

    let total_distance_km = distance_km(start, near_start.vertex)
        + distance_km(near_start.vertex, near_end.vertex)
        + distance_km(near_end.vertex, end);

    Some(CablePathEstimate {
        start,
        nearest_start_vertex: near_start.vertex,
        nearest_end_vertex: near_end.vertex,
        end,
        start_cable_id: near_start.cable_id,
        end_cable_id: near_end.cable_id,
        total_distance_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::theoretical_latency_ms;

    fn cable(id: CableId, points: &[(f64, f64)]) -> CablePolyline {
        CablePolyline {
            id,
            tags: BTreeMap::new(),
            geometry: points.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect(),
        }
    }

    fn transatlantic() -> Vec<CablePolyline> {
        vec![
            cable(1, &[(50.8, -4.5), (50.0, -20.0), (45.0, -45.0), (40.5, -73.0)]),
            cable(2, &[(36.0, -5.5), (35.0, -30.0), (33.0, -60.0)]),
        ]
    }

    #[test]
    fn empty_cables_give_no_estimate() {
        let start = GeoPoint::new(51.5, -0.12);
        let end = GeoPoint::new(40.7, -74.0);
        assert!(nearest_cable_vertex(start, &[]).is_none());
        assert!(estimate_cable_path(start, end, &[]).is_none());
    }

    #[test]
    fn single_vertex_cables_are_ignored() {
        let cables = vec![cable(7, &[(51.5, -0.12)]), cable(8, &[(0.0, 0.0), (1.0, 1.0)])];
        let nearest = nearest_cable_vertex(GeoPoint::new(51.5, -0.12), &cables).unwrap();
        assert_eq!(nearest.cable_id, 8);
        assert_eq!(nearest.index, 1);

        let only_degenerate = vec![cable(7, &[(51.5, -0.12)])];
        assert!(nearest_cable_vertex(GeoPoint::new(51.5, -0.12), &only_degenerate).is_none());
        assert!(estimate_cable_path(
            GeoPoint::new(51.5, -0.12),
            GeoPoint::new(40.7, -74.0),
            &only_degenerate
        )
        .is_none());
    }

    #[test]
    fn first_minimum_wins_ties() {
        let cables = vec![
            cable(1, &[(0.0, 1.0), (10.0, 10.0)]),
            cable(2, &[(0.0, -1.0), (-10.0, -10.0)]),
        ];
        let nearest = nearest_cable_vertex(GeoPoint::new(0.0, 0.0), &cables).unwrap();
        assert_eq!(nearest.cable_id, 1);
        assert_eq!(nearest.index, 0);
    }

    #[test]
    fn nearest_vertex_on_transatlantic_cables() {
        let cables = transatlantic();
        let nearest = nearest_cable_vertex(GeoPoint::new(51.5074, -0.1278), &cables).unwrap();
        assert_eq!(nearest.vertex, GeoPoint::new(50.8, -4.5));
        assert_eq!(nearest.cable_id, 1);
        let expected = distance_km(GeoPoint::new(51.5074, -0.1278), nearest.vertex);
        assert_eq!(nearest.distance_km, expected);
    }

    #[test]
    fn total_is_sum_of_three_segments() {
        let start = GeoPoint::new(51.5074, -0.1278);
        let end = GeoPoint::new(40.7128, -74.0060);
        let estimate = estimate_cable_path(start, end, &transatlantic()).unwrap();

        assert_eq!(estimate.start, start);
        assert_eq!(estimate.end, end);
        assert_eq!(estimate.nearest_end_vertex, GeoPoint::new(40.5, -73.0));

        let expected = distance_km(start, estimate.nearest_start_vertex)
            + distance_km(estimate.nearest_start_vertex, estimate.nearest_end_vertex)
            + distance_km(estimate.nearest_end_vertex, end);
        assert_eq!(estimate.total_distance_km, expected);

        let [a, b, c] = estimate.segments();
        assert_eq!(a + b + c, estimate.total_distance_km);
        assert!(estimate.total_distance_km >= distance_km(start, end));
    }

    #[test]
    fn middle_hop_does_not_follow_the_cable() {
        // Both ends snap to the same cable; the intermediate vertices are skipped.
        let start = GeoPoint::new(51.5074, -0.1278);
        let end = GeoPoint::new(40.7128, -74.0060);
        let estimate = estimate_cable_path(start, end, &transatlantic()).unwrap();
        let along_cable: f64 = transatlantic()[0]
            .geometry
            .windows(2)
            .map(|w| distance_km(w[0], w[1]))
            .sum();
        let [_, middle, _] = estimate.segments();
        assert!(middle < along_cable);
    }

    #[test]
    fn cable_latency_uses_assembled_distance() {
        let start = GeoPoint::new(51.5074, -0.1278);
        let end = GeoPoint::new(40.7128, -74.0060);
        let estimate = estimate_cable_path(start, end, &transatlantic()).unwrap();
        let expected = theoretical_latency_ms(start, end, Some(estimate.total_distance_km));
        assert_eq!(estimate.latency_ms(PropagationModel::FIBER), expected);
        assert!(expected >= theoretical_latency_ms(start, end, None));
    }

    #[test]
    fn path_points_in_order() {
        let start = GeoPoint::new(36.1, -5.3);
        let end = GeoPoint::new(33.2, -60.1);
        let estimate = estimate_cable_path(start, end, &transatlantic()).unwrap();
        assert_eq!(
            estimate.path(),
            [start, GeoPoint::new(36.0, -5.5), GeoPoint::new(33.0, -60.0), end]
        );
        assert_eq!(estimate.start_cable_id, 2);
        assert_eq!(estimate.end_cable_id, 2);
    }
}
