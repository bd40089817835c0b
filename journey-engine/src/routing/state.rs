//! Traversal states.
//!
//! A [`State`] is an immutable snapshot of a partial journey at a vertex. It
//! points back at the state it was extended from, so the states of one
//! search form a backward-linked chain rather than a tree with children.

use std::fmt;
use std::sync::Arc;

use crate::domain::TraverseMode;
use crate::graph::{EdgeId, PatternId, VertexId};

use super::context::RoutingContext;

/// The trip a state is on board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripRef {
    pub pattern: PatternId,
    pub trip_index: usize,
    /// Epoch second of midnight of the trip's service day.
    pub service_day: i64,
}

/// Fare-relevant bookkeeping, shared between states until it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FareContext {
    /// Fare zones passed through, in first-visit order.
    pub zones: Vec<Arc<str>>,
    /// Routes ridden, in first-ride order.
    pub routes: Vec<Arc<str>>,
}

impl FareContext {
    pub(crate) fn add_zone(&mut self, zone: &Arc<str>) {
        if !self.zones.contains(zone) {
            self.zones.push(zone.clone());
        }
    }

    pub(crate) fn add_route(&mut self, route: &Arc<str>) {
        if !self.routes.contains(route) {
            self.routes.push(route.clone());
        }
    }
}

/// The fields of a state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StateData {
    pub(crate) vertex: VertexId,
    pub(crate) back_edge: Option<EdgeId>,
    pub(crate) back_state: Option<State>,
    /// Epoch seconds.
    pub(crate) time: i64,
    pub(crate) start_time: i64,
    pub(crate) weight: f64,
    pub(crate) walk_distance: f64,
    pub(crate) mode: TraverseMode,
    /// Street mode to resume after alighting.
    pub(crate) street_mode: TraverseMode,
    pub(crate) boardings: u32,
    pub(crate) trip: Option<TripRef>,
    pub(crate) fare: Arc<FareContext>,
    pub(crate) arrive_by: bool,
}

/// An immutable, cheaply cloned traversal state.
///
/// Equality is identity: two `State`s are equal when they are the same
/// allocation.
#[derive(Clone)]
pub struct State(pub(crate) Arc<StateData>);

impl State {
    /// The state a search starts from.
    pub fn initial(ctx: &RoutingContext) -> Self {
        let mode = ctx.request.initial_street_mode();
        State(Arc::new(StateData {
            vertex: ctx.origin,
            back_edge: None,
            back_state: None,
            time: ctx.start_time,
            start_time: ctx.start_time,
            weight: 0.0,
            walk_distance: 0.0,
            mode,
            street_mode: mode,
            boardings: 0,
            trip: None,
            fare: Arc::new(FareContext::default()),
            arrive_by: ctx.request.arrive_by,
        }))
    }

    pub fn vertex(&self) -> VertexId {
        self.0.vertex
    }

    /// Edge used to reach this state; `None` for the initial state.
    pub fn back_edge(&self) -> Option<EdgeId> {
        self.0.back_edge
    }

    /// State this one was extended from.
    pub fn back_state(&self) -> Option<&State> {
        self.0.back_state.as_ref()
    }

    /// Clock time at this state, epoch seconds.
    pub fn time(&self) -> i64 {
        self.0.time
    }

    pub fn start_time(&self) -> i64 {
        self.0.start_time
    }

    /// Seconds since the search started, always non-negative.
    pub fn elapsed_secs(&self) -> i64 {
        (self.0.time - self.0.start_time).abs()
    }

    pub fn weight(&self) -> f64 {
        self.0.weight
    }

    pub fn walk_distance(&self) -> f64 {
        self.0.walk_distance
    }

    pub fn mode(&self) -> TraverseMode {
        self.0.mode
    }

    pub fn boardings(&self) -> u32 {
        self.0.boardings
    }

    /// Transfers made so far: boardings after the first.
    pub fn transfers(&self) -> u32 {
        self.0.boardings.saturating_sub(1)
    }

    pub fn trip(&self) -> Option<TripRef> {
        self.0.trip
    }

    pub fn is_on_board(&self) -> bool {
        self.0.trip.is_some()
    }

    pub fn fare(&self) -> &FareContext {
        &self.0.fare
    }

    pub fn is_arrive_by(&self) -> bool {
        self.0.arrive_by
    }

    /// Whether `self` and `other` are the same state.
    pub fn same_as(&self, other: &State) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether `self`'s clock time is at least as good as `other`'s for
    /// the search direction.
    pub fn time_not_worse_than(&self, other: &State) -> bool {
        if self.0.arrive_by {
            self.0.time >= other.0.time
        } else {
            self.0.time <= other.0.time
        }
    }

    /// Number of states in the chain back to the initial state.
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut cursor = self.back_state();
        while let Some(s) = cursor {
            len += 1;
            cursor = s.back_state();
        }
        len
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("vertex", &self.0.vertex)
            .field("back_edge", &self.0.back_edge)
            .field("time", &self.0.time)
            .field("weight", &self.0.weight)
            .field("walk_distance", &self.0.walk_distance)
            .field("mode", &self.0.mode)
            .field("boardings", &self.0.boardings)
            .field("trip", &self.0.trip)
            .finish()
    }
}
