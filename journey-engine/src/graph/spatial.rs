//! Nearest-edge and nearest-vertex lookup.

use std::cmp::Ordering;

use crate::domain::{Coordinate, TraverseModeSet, bearing_difference};

use super::edge::EdgeId;
use super::network::Graph;
use super::vertex::{VertexId, VertexKind};

/// What a linked edge or vertex must allow.
#[derive(Debug, Clone, Copy)]
pub struct LinkRequirements {
    pub modes: TraverseModeSet,
    pub wheelchair: bool,
    /// Candidates further away than this are ignored.
    pub max_distance_m: f64,
    /// Preferred direction of travel, if known.
    pub bearing: Option<u16>,
}

impl Default for LinkRequirements {
    fn default() -> Self {
        Self {
            modes: TraverseModeSet::all_street(),
            wheelchair: false,
            max_distance_m: 1000.0,
            bearing: None,
        }
    }
}

/// An edge near a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateEdge {
    pub edge: EdgeId,
    pub distance_m: f64,
    /// Difference between the edge bearing and the requested bearing.
    pub bearing_difference: u16,
}

/// Street edges near a point, best first.
#[derive(Debug, Clone, Default)]
pub struct CandidateEdgeBundle {
    pub candidates: Vec<CandidateEdge>,
}

impl CandidateEdgeBundle {
    pub fn best(&self) -> Option<&CandidateEdge> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Spatial lookups over a network snapshot.
pub trait SpatialIndex: Send + Sync {
    /// Street edges near `coordinate`, ranked by distance then bearing.
    fn nearest_edges(
        &self,
        graph: &Graph,
        coordinate: &Coordinate,
        requirements: &LinkRequirements,
    ) -> CandidateEdgeBundle;

    /// The closest vertex a street search can start or end at.
    fn nearest_vertex(
        &self,
        graph: &Graph,
        coordinate: &Coordinate,
        requirements: &LinkRequirements,
    ) -> Option<VertexId>;
}

/// Brute-force index that scans the whole snapshot.
///
/// Adequate for small networks and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSpatialIndex;

impl SpatialIndex for LinearSpatialIndex {
    fn nearest_edges(
        &self,
        graph: &Graph,
        coordinate: &Coordinate,
        requirements: &LinkRequirements,
    ) -> CandidateEdgeBundle {
        let mut candidates: Vec<CandidateEdge> = graph
            .edges()
            .filter_map(|edge| {
                let street = edge.as_street()?;
                if street.permission.intersection(requirements.modes).is_empty() {
                    return None;
                }
                if requirements.wheelchair && !street.wheelchair_accessible {
                    return None;
                }
                let a = graph.vertex(edge.from)?.coordinate;
                let b = graph.vertex(edge.to)?.coordinate;
                let distance_m = coordinate.distance_to_segment(&a, &b);
                if distance_m > requirements.max_distance_m {
                    return None;
                }
                let bearing_difference = requirements
                    .bearing
                    .map(|bearing| bearing_difference(bearing, street.in_angle))
                    .unwrap_or(0);
                Some(CandidateEdge {
                    edge: edge.id,
                    distance_m,
                    bearing_difference,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(Ordering::Equal)
                .then(a.bearing_difference.cmp(&b.bearing_difference))
                .then(a.edge.cmp(&b.edge))
        });
        CandidateEdgeBundle { candidates }
    }

    fn nearest_vertex(
        &self,
        graph: &Graph,
        coordinate: &Coordinate,
        requirements: &LinkRequirements,
    ) -> Option<VertexId> {
        graph
            .vertices()
            .filter(|v| v.kind.is_street_linkable())
            .filter(|v| match &v.kind {
                VertexKind::TransitStop {
                    wheelchair_boarding,
                    ..
                } => !requirements.wheelchair || *wheelchair_boarding,
                _ => true,
            })
            .map(|v| (v.id, v.coordinate.distance_to(coordinate)))
            .filter(|(_, d)| *d <= requirements.max_distance_m)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }
}
