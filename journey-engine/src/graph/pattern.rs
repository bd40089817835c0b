//! Trip patterns: ordered stop sequences shared by a set of trips.

use std::fmt;
use std::sync::Arc;

use crate::domain::TraverseMode;

use super::error::GraphError;
use super::vertex::VertexId;

/// Stable index of a pattern in a [`Graph`](super::Graph).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(pub u32);

impl PatternId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Times of one trip at every stop of its pattern.
///
/// Times are seconds after midnight of the service day and may exceed
/// 86400 for trips running past midnight.
#[derive(Debug, Clone, PartialEq)]
pub struct TripTimes {
    pub trip_id: Arc<str>,
    pub arrivals: Vec<i64>,
    pub departures: Vec<i64>,
    pub wheelchair_accessible: bool,
}

impl TripTimes {
    /// Build a trip whose arrival equals its departure at every stop.
    pub fn uniform(trip_id: &str, times: &[i64]) -> Self {
        Self {
            trip_id: Arc::from(trip_id),
            arrivals: times.to_vec(),
            departures: times.to_vec(),
            wheelchair_accessible: true,
        }
    }
}

/// A sequence of stops visited by a group of trips of one route.
///
/// Trips are kept sorted by departure from the first stop, and no trip
/// arrives anywhere before the trip ahead of it. Departures can still
/// interleave where one trip dwells longer than the next.
#[derive(Debug, Clone)]
pub struct TripPattern {
    pub id: PatternId,
    pub route_id: Arc<str>,
    pub mode: TraverseMode,
    /// Off-board stop vertices, in visiting order.
    pub stops: Vec<VertexId>,
    trips: Vec<TripTimes>,
}

impl TripPattern {
    /// Create a pattern, validating trip times against the stop list.
    pub fn new(
        id: PatternId,
        route_id: &str,
        mode: TraverseMode,
        stops: Vec<VertexId>,
        mut trips: Vec<TripTimes>,
    ) -> Result<Self, GraphError> {
        if stops.len() < 2 {
            return Err(GraphError::InvalidPattern("needs at least two stops".into()));
        }
        if !mode.is_transit() {
            return Err(GraphError::InvalidPattern(format!("{mode} is not a transit mode")));
        }
        for trip in &trips {
            if trip.arrivals.len() != stops.len() || trip.departures.len() != stops.len() {
                return Err(GraphError::InvalidPattern(format!(
                    "trip {} has {} times for {} stops",
                    trip.trip_id,
                    trip.departures.len(),
                    stops.len()
                )));
            }
            let mut last = i64::MIN;
            for (arr, dep) in trip.arrivals.iter().zip(&trip.departures) {
                if *arr < last || dep < arr {
                    return Err(GraphError::InvalidPattern(format!(
                        "trip {} times go backwards",
                        trip.trip_id
                    )));
                }
                last = *dep;
            }
        }
        trips.sort_by_key(|t| t.departures[0]);
        for pair in trips.windows(2) {
            let overtakes = pair[0]
                .arrivals
                .iter()
                .zip(&pair[1].arrivals)
                .any(|(a, b)| a > b);
            if overtakes {
                return Err(GraphError::InvalidPattern(format!(
                    "trip {} overtakes trip {}",
                    pair[1].trip_id, pair[0].trip_id
                )));
            }
        }
        Ok(Self {
            id,
            route_id: Arc::from(route_id),
            mode,
            stops,
            trips,
        })
    }

    pub fn trips(&self) -> &[TripTimes] {
        &self.trips
    }

    pub fn trip(&self, index: usize) -> Option<&TripTimes> {
        self.trips.get(index)
    }

    /// Shortest scheduled run time between departing `stop_index` and
    /// arriving at the next stop, over all trips.
    pub fn min_hop_secs(&self, stop_index: usize) -> i64 {
        self.trips
            .iter()
            .map(|t| t.arrivals[stop_index + 1] - t.departures[stop_index])
            .min()
            .unwrap_or(0)
    }

    /// Shortest dwell at `stop_index`, over all trips.
    pub fn min_dwell_secs(&self, stop_index: usize) -> i64 {
        self.trips
            .iter()
            .map(|t| t.departures[stop_index] - t.arrivals[stop_index])
            .min()
            .unwrap_or(0)
    }
}
