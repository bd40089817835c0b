//! Network vertices.

use std::fmt;
use std::sync::Arc;

use crate::domain::Coordinate;

use super::edge::EdgeId;
use super::pattern::PatternId;

/// Stable index of a vertex in a [`Graph`](super::Graph).
///
/// Ids are never reused, even after the vertex is removed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

impl VertexId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// What a vertex represents.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexKind {
    /// A street intersection or a point along a street.
    Intersection {
        traffic_light: bool,
        /// Explicitly flagged as free-flowing (no turn cost).
        free_flowing: bool,
    },
    /// A transit stop, off-board.
    TransitStop {
        stop_id: Arc<str>,
        zone: Option<Arc<str>>,
        wheelchair_boarding: bool,
    },
    /// On-board a pattern, about to depart `stop_index`.
    PatternDepart { pattern: PatternId, stop_index: usize },
    /// On-board a pattern, having arrived at `stop_index`.
    PatternArrive { pattern: PatternId, stop_index: usize },
    /// A landing of an elevator.
    ElevatorLanding { level: i16 },
    /// Interior of a station (concourse, platform area).
    StationInterior,
}

impl VertexKind {
    /// Plain intersection with no signal.
    pub fn intersection() -> Self {
        VertexKind::Intersection {
            traffic_light: false,
            free_flowing: false,
        }
    }

    /// Returns true if a traveller standing here is not on board a vehicle.
    pub fn is_off_board(&self) -> bool {
        !matches!(
            self,
            VertexKind::PatternDepart { .. } | VertexKind::PatternArrive { .. }
        )
    }

    /// Returns true for vertices that a street search can start or end at.
    pub fn is_street_linkable(&self) -> bool {
        matches!(
            self,
            VertexKind::Intersection { .. } | VertexKind::TransitStop { .. }
        )
    }
}

/// A place in the network.
///
/// Vertices own their incident edge lists. A published vertex is never
/// modified; the graph editor replaces it with a new `Arc<Vertex>`.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub label: Arc<str>,
    pub coordinate: Coordinate,
    pub kind: VertexKind,
    pub(crate) outgoing: Vec<EdgeId>,
    pub(crate) incoming: Vec<EdgeId>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, label: &str, coordinate: Coordinate, kind: VertexKind) -> Self {
        Self {
            id,
            label: Arc::from(label),
            coordinate,
            kind,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Ids of edges leaving this vertex.
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    /// Ids of edges entering this vertex.
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn degree_in(&self) -> usize {
        self.incoming.len()
    }

    pub fn degree_out(&self) -> usize {
        self.outgoing.len()
    }

    /// Whether an intersection can be crossed without any turn cost.
    ///
    /// Either flagged explicitly, or inferred when the vertex only joins one
    /// way in to one way out and has no signal.
    pub fn inferred_free_flowing(&self) -> bool {
        match self.kind {
            VertexKind::Intersection {
                traffic_light,
                free_flowing,
            } => free_flowing || (self.degree_in() == 1 && self.degree_out() == 1 && !traffic_light),
            _ => true,
        }
    }

    pub fn has_traffic_light(&self) -> bool {
        matches!(
            self.kind,
            VertexKind::Intersection {
                traffic_light: true,
                ..
            }
        )
    }

    /// Fare zone of a transit stop.
    pub fn zone(&self) -> Option<&Arc<str>> {
        match &self.kind {
            VertexKind::TransitStop { zone, .. } => zone.as_ref(),
            _ => None,
        }
    }
}
