//! Paths reconstructed from state chains.

use std::sync::Arc;

use crate::graph::{EdgeId, Graph, VertexId};

use super::state::{State, TripRef};

/// A journey read from origin to destination, whatever the search
/// direction was.
#[derive(Debug, Clone)]
pub struct GraphPath {
    /// States in travel order.
    pub states: Vec<State>,
    /// Edges between consecutive states, in travel order.
    pub edges: Vec<EdgeId>,
    weight: f64,
    walk_distance: f64,
    boardings: u32,
}

impl GraphPath {
    /// Follow back-references from `last` to the initial state.
    ///
    /// Depart-at chains run destination to origin and are reversed.
    /// Arrive-by chains already start at the origin.
    pub fn from_state(last: &State) -> Self {
        let mut states = Vec::with_capacity(last.chain_len());
        let mut cursor = Some(last);
        while let Some(state) = cursor {
            states.push(state.clone());
            cursor = state.back_state();
        }
        let mut edges: Vec<EdgeId> = states.iter().filter_map(State::back_edge).collect();
        if !last.is_arrive_by() {
            states.reverse();
            edges.reverse();
        }
        Self {
            states,
            edges,
            weight: last.weight(),
            walk_distance: last.walk_distance(),
            boardings: last.boardings(),
        }
    }

    /// Append a path starting where this one ends.
    pub fn join(mut self, next: GraphPath) -> Self {
        let skip = match (self.states.last(), next.states.first()) {
            (Some(a), Some(b)) if a.vertex() == b.vertex() => 1,
            _ => 0,
        };
        self.states.extend(next.states.into_iter().skip(skip));
        self.edges.extend(next.edges);
        self.weight += next.weight;
        self.walk_distance += next.walk_distance;
        self.boardings += next.boardings;
        self
    }

    /// Epoch seconds at the origin.
    pub fn start_time(&self) -> i64 {
        self.states.first().map_or(0, State::time)
    }

    /// Epoch seconds at the destination.
    pub fn end_time(&self) -> i64 {
        self.states.last().map_or(0, State::time)
    }

    pub fn duration_secs(&self) -> i64 {
        self.end_time() - self.start_time()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn walk_distance(&self) -> f64 {
        self.walk_distance
    }

    pub fn boardings(&self) -> u32 {
        self.boardings
    }

    pub fn vertices(&self) -> Vec<VertexId> {
        self.states.iter().map(State::vertex).collect()
    }

    /// Trips ridden, in travel order.
    pub fn trips(&self) -> Vec<TripRef> {
        let mut trips: Vec<TripRef> = Vec::new();
        for trip in self.states.iter().filter_map(State::trip) {
            if trips.last() != Some(&trip) {
                trips.push(trip);
            }
        }
        trips
    }

    /// Ids of the trips ridden, resolved against `graph`.
    pub fn trip_ids(&self, graph: &Graph) -> Vec<Arc<str>> {
        self.trips()
            .iter()
            .filter_map(|t| graph.pattern(t.pattern)?.trip(t.trip_index))
            .map(|t| t.trip_id.clone())
            .collect()
    }

    /// Routes ridden, in travel order.
    pub fn routes(&self, graph: &Graph) -> Vec<Arc<str>> {
        let mut routes: Vec<Arc<str>> = Vec::new();
        for trip in self.trips() {
            if let Some(pattern) = graph.pattern(trip.pattern)
                && !routes.contains(&pattern.route_id)
            {
                routes.push(pattern.route_id.clone());
            }
        }
        routes
    }
}
