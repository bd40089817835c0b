//! Network edges.
//!
//! Edge behaviour is a tagged variant ([`EdgeKind`]); traversal is dispatched
//! through the `Traversable` capability in the routing module. Geometry and
//! elevation are separate capabilities only some variants have.

use std::fmt;
use std::sync::Arc;

use crate::domain::{Alert, TraverseMode, TraverseModeSet};

use super::pattern::PatternId;
use super::vertex::VertexId;

/// Stable index of an edge in a [`Graph`](super::Graph).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Climbing along a street segment, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationProfile {
    pub rise_m: f64,
    pub fall_m: f64,
}

/// Extra flat-ground meters a walker spends per meter climbed (Naismith).
const WALK_CLIMB_FACTOR: f64 = 7.92;

/// Extra flat-ground meters a cyclist spends per meter climbed.
const BIKE_CLIMB_FACTOR: f64 = 5.0;

/// A street segment usable by walking, cycling or driving.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetEdge {
    pub name: Arc<str>,
    pub length_m: f64,
    /// Bearing leaving the source vertex, degrees.
    pub in_angle: u16,
    /// Bearing arriving at the target vertex, degrees.
    pub out_angle: u16,
    pub permission: TraverseModeSet,
    pub wheelchair_accessible: bool,
    /// Posted car speed in m/s.
    pub car_speed: f64,
    pub elevation: Option<ElevationProfile>,
}

impl StreetEdge {
    /// A straight two-way-permission segment with default car speed.
    pub fn new(name: &str, length_m: f64, bearing: u16) -> Self {
        Self {
            name: Arc::from(name),
            length_m,
            in_angle: bearing,
            out_angle: bearing,
            permission: TraverseModeSet::all_street(),
            wheelchair_accessible: true,
            car_speed: 11.2,
            elevation: None,
        }
    }
}

/// Board a trip of `pattern` at `stop_index`: stop -> pattern-depart vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardEdge {
    pub pattern: PatternId,
    pub stop_index: usize,
}

/// Leave a trip of `pattern` at `stop_index`: pattern-arrive -> stop vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlightEdge {
    pub pattern: PatternId,
    pub stop_index: usize,
}

/// Ride from `stop_index` to `stop_index + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopEdge {
    pub pattern: PatternId,
    pub stop_index: usize,
}

/// Stay on board at `stop_index`: pattern-arrive -> pattern-depart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellEdge {
    pub pattern: PatternId,
    pub stop_index: usize,
}

/// Elevator ride between two landings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevatorEdge {
    pub travel_secs: i64,
    pub permission: TraverseModeSet,
}

/// Walking transfer between two stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferEdge {
    pub seconds: i64,
    pub distance_m: f64,
    pub wheelchair_accessible: bool,
}

/// The behaviour of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    Street(StreetEdge),
    Board(BoardEdge),
    Alight(AlightEdge),
    Hop(HopEdge),
    Dwell(DwellEdge),
    /// Zero-cost link between co-located vertices.
    FreeConnector,
    Elevator(ElevatorEdge),
    Transfer(TransferEdge),
}

/// A directed connection between two vertices.
///
/// Published edges are immutable. Attaching an alert produces a replacement
/// edge with the same id.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub kind: EdgeKind,
    pub alerts: Arc<[Alert]>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, from: VertexId, to: VertexId, kind: EdgeKind) -> Self {
        Self {
            id,
            from,
            to,
            kind,
            alerts: Arc::from(Vec::new()),
        }
    }

    /// True if an active no-service alert blocks the edge at `epoch_secs`.
    pub fn is_blocked_at(&self, epoch_secs: i64) -> bool {
        self.alerts.iter().any(|a| a.blocks_at(epoch_secs))
    }

    /// The street segment, if this is a street edge.
    pub fn as_street(&self) -> Option<&StreetEdge> {
        match &self.kind {
            EdgeKind::Street(street) => Some(street),
            _ => None,
        }
    }

    /// The pattern this edge belongs to, for transit edges.
    pub fn pattern(&self) -> Option<PatternId> {
        match &self.kind {
            EdgeKind::Board(e) => Some(e.pattern),
            EdgeKind::Alight(e) => Some(e.pattern),
            EdgeKind::Hop(e) => Some(e.pattern),
            EdgeKind::Dwell(e) => Some(e.pattern),
            _ => None,
        }
    }
}

/// Edges with a physical length and bearings.
pub trait HasGeometry {
    fn length_m(&self) -> f64;

    /// Bearing leaving the source, degrees.
    fn in_angle(&self) -> u16;

    /// Bearing arriving at the target, degrees.
    fn out_angle(&self) -> u16;
}

impl HasGeometry for StreetEdge {
    fn length_m(&self) -> f64 {
        self.length_m
    }

    fn in_angle(&self) -> u16 {
        self.in_angle
    }

    fn out_angle(&self) -> u16 {
        self.out_angle
    }
}

/// Edges whose cost depends on terrain.
pub trait HasElevationProfile: HasGeometry {
    fn elevation(&self) -> Option<&ElevationProfile>;

    /// Flat-equivalent length for `mode`.
    ///
    /// Climbing only ever adds length, so the effective length is never
    /// shorter than the geometric one.
    fn effective_length_m(&self, mode: TraverseMode) -> f64 {
        let Some(profile) = self.elevation() else {
            return self.length_m();
        };
        let factor = match mode {
            TraverseMode::Walk => WALK_CLIMB_FACTOR,
            TraverseMode::Bicycle => BIKE_CLIMB_FACTOR,
            _ => 0.0,
        };
        self.length_m() + profile.rise_m.max(0.0) * factor
    }
}

impl HasElevationProfile for StreetEdge {
    fn elevation(&self) -> Option<&ElevationProfile> {
        self.elevation.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AlertEffect;

    #[test]
    fn climbing_lengthens_walks_and_rides() {
        let mut street = StreetEdge::new("Hill Road", 100.0, 0);
        assert_eq!(street.effective_length_m(TraverseMode::Walk), 100.0);

        street.elevation = Some(ElevationProfile {
            rise_m: 10.0,
            fall_m: 2.0,
        });
        assert!((street.effective_length_m(TraverseMode::Walk) - 179.2).abs() < 1e-9);
        assert!((street.effective_length_m(TraverseMode::Bicycle) - 150.0).abs() < 1e-9);
        assert_eq!(street.effective_length_m(TraverseMode::Car), 100.0);
    }

    #[test]
    fn blocked_only_by_active_no_service_alerts() {
        let mut edge = Edge::new(EdgeId(0), VertexId(0), VertexId(1), EdgeKind::FreeConnector);
        assert!(!edge.is_blocked_at(0));

        edge.alerts = Arc::from(vec![Alert {
            feed_id: "f".into(),
            id: "a".into(),
            header: "closed".into(),
            effect: AlertEffect::NoService,
            active_from: None,
            active_until: None,
        }]);
        assert!(edge.is_blocked_at(0));
    }
}
