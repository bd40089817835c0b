//! Single-use builder for child states.

use std::sync::Arc;

use tracing::warn;

use crate::domain::TraverseMode;
use crate::graph::Edge;

use super::state::{State, StateData, TripRef};

/// Builds the state reached by traversing one edge from a parent state.
///
/// The editor owns a private copy of the parent's fields; the parent is only
/// borrowed and never changes. Time increments are given as positive
/// durations and applied in the search direction. A negative increment marks
/// the editor defective and [`make_state`](Self::make_state) returns `None`.
pub struct StateEditor<'a> {
    parent: &'a State,
    child: StateData,
    defective: bool,
}

impl<'a> StateEditor<'a> {
    pub fn new(parent: &'a State, edge: &Edge) -> Self {
        let mut child = (*parent.0).clone();
        child.vertex = if parent.is_arrive_by() {
            edge.from
        } else {
            edge.to
        };
        child.back_edge = Some(edge.id);
        child.back_state = Some(parent.clone());
        Self {
            parent,
            child,
            defective: false,
        }
    }

    pub fn parent(&self) -> &State {
        self.parent
    }

    /// Current clock time of the child.
    pub fn time(&self) -> i64 {
        self.child.time
    }

    pub fn boardings(&self) -> u32 {
        self.child.boardings
    }

    /// Advance the clock by `secs` in the search direction.
    pub fn increment_time(&mut self, secs: i64) {
        if secs < 0 {
            warn!(secs, edge = ?self.child.back_edge, "negative time increment");
            self.defective = true;
            return;
        }
        if self.child.arrive_by {
            self.child.time -= secs;
        } else {
            self.child.time += secs;
        }
    }

    pub fn increment_weight(&mut self, weight: f64) {
        if !weight.is_finite() || weight < 0.0 {
            warn!(weight, edge = ?self.child.back_edge, "invalid weight increment");
            self.defective = true;
            return;
        }
        self.child.weight += weight;
    }

    pub fn increment_walk_distance(&mut self, meters: f64) {
        if !meters.is_finite() || meters < 0.0 {
            self.defective = true;
            return;
        }
        self.child.walk_distance += meters;
    }

    pub fn set_mode(&mut self, mode: TraverseMode) {
        self.child.mode = mode;
    }

    /// Leave the vehicle and resume the street mode used before boarding.
    pub fn leave_vehicle(&mut self) {
        self.child.trip = None;
        self.child.mode = self.child.street_mode;
    }

    /// Step on board `trip`.
    pub fn enter_vehicle(&mut self, trip: TripRef, mode: TraverseMode) {
        self.child.trip = Some(trip);
        self.child.mode = mode;
    }

    pub fn increment_boardings(&mut self) {
        self.child.boardings += 1;
    }

    pub fn add_zone(&mut self, zone: &Arc<str>) {
        if !self.child.fare.zones.contains(zone) {
            Arc::make_mut(&mut self.child.fare).add_zone(zone);
        }
    }

    pub fn add_route(&mut self, route: &Arc<str>) {
        if !self.child.fare.routes.contains(route) {
            Arc::make_mut(&mut self.child.fare).add_route(route);
        }
    }

    /// Finish the edit. Consumes the editor so it cannot be reused.
    pub fn make_state(self) -> Option<State> {
        if self.defective {
            return None;
        }
        Some(State(Arc::new(self.child)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fixtures::{self, at, hm};
    use crate::routing::{Location, RoutingContext, RoutingRequest};

    fn context(arrive_by: bool) -> RoutingContext {
        let request = RoutingRequest {
            arrive_by,
            ..RoutingRequest::new(Location::vertex("0,0"), Location::vertex("1,0"), at(hm(8, 0)))
        };
        RoutingContext::goal_directed(Arc::new(fixtures::grid(2, 1)), &request).unwrap()
    }

    #[test]
    fn child_points_back_at_parent() {
        let ctx = context(false);
        let s0 = State::initial(&ctx);
        let edge = ctx.graph.outgoing(ctx.origin).next().unwrap();

        let mut editor = StateEditor::new(&s0, edge);
        editor.increment_time(30);
        editor.increment_weight(12.5);
        editor.increment_walk_distance(40.0);
        let s1 = editor.make_state().unwrap();

        assert_eq!(s1.vertex(), edge.to);
        assert_eq!(s1.back_edge(), Some(edge.id));
        assert!(s1.back_state().unwrap().same_as(&s0));
        assert_eq!(s1.time(), s0.time() + 30);
        assert_eq!(s1.weight(), 12.5);
        assert_eq!(s1.walk_distance(), 40.0);
        assert_eq!(s0.weight(), 0.0);
        assert!(s0.back_state().is_none());
    }

    #[test]
    fn arrive_by_runs_the_clock_backwards() {
        let ctx = context(true);
        let s0 = State::initial(&ctx);
        let edge = ctx.graph.incoming(ctx.origin).next().unwrap();

        let mut editor = StateEditor::new(&s0, edge);
        editor.increment_time(30);
        let s1 = editor.make_state().unwrap();

        assert_eq!(s1.vertex(), edge.from);
        assert_eq!(s1.time(), s0.time() - 30);
    }

    #[test]
    fn invalid_increments_yield_nothing() {
        let ctx = context(false);
        let s0 = State::initial(&ctx);
        let edge = ctx.graph.outgoing(ctx.origin).next().unwrap();

        let mut editor = StateEditor::new(&s0, edge);
        editor.increment_time(-1);
        assert!(editor.make_state().is_none());

        let mut editor = StateEditor::new(&s0, edge);
        editor.increment_weight(f64::NAN);
        assert!(editor.make_state().is_none());

        let mut editor = StateEditor::new(&s0, edge);
        editor.increment_weight(-0.5);
        assert!(editor.make_state().is_none());
    }
}
