//! Edge traversal: the cost model.
//!
//! Every edge kind knows how to extend a state across itself in either
//! search direction. An unusable edge yields no state; a boarding edge may
//! fork into several.

use std::sync::Arc;

use crate::domain::TraverseMode;
use crate::graph::{
    AlightEdge, BoardEdge, DwellEdge, Edge, EdgeKind, ElevatorEdge, HasElevationProfile, HopEdge,
    PatternId, StreetEdge, TransferEdge, TripPattern, TripTimes, VertexId, VertexKind,
};

use super::context::RoutingContext;
use super::editor::StateEditor;
use super::request::RoutingRequest;
use super::state::{State, TripRef};

const SECONDS_PER_DAY: i64 = 86_400;

/// The states produced by one traversal. Lazy and finite.
#[derive(Debug)]
pub enum TraversalOutcomes {
    Empty,
    One(State),
    Many(std::vec::IntoIter<State>),
}

impl TraversalOutcomes {
    fn from_option(state: Option<State>) -> Self {
        match state {
            Some(s) => TraversalOutcomes::One(s),
            None => TraversalOutcomes::Empty,
        }
    }

    fn from_vec(mut states: Vec<State>) -> Self {
        match states.len() {
            0 => TraversalOutcomes::Empty,
            1 => TraversalOutcomes::from_option(states.pop()),
            _ => TraversalOutcomes::Many(states.into_iter()),
        }
    }
}

impl Iterator for TraversalOutcomes {
    type Item = State;

    fn next(&mut self) -> Option<State> {
        match std::mem::replace(self, TraversalOutcomes::Empty) {
            TraversalOutcomes::Empty => None,
            TraversalOutcomes::One(state) => Some(state),
            TraversalOutcomes::Many(mut iter) => {
                let next = iter.next();
                *self = TraversalOutcomes::Many(iter);
                next
            }
        }
    }
}

/// The capability every edge has: extending a state across it.
pub trait Traversable {
    /// States reached by crossing this edge from `s0` in the search
    /// direction. Never modifies `s0`.
    fn traverse(&self, s0: &State, ctx: &RoutingContext) -> TraversalOutcomes;

    /// A lower bound on the weight any traversal can add.
    ///
    /// Infinite if the request can never use the edge.
    fn weight_lower_bound(&self, ctx: &RoutingContext) -> f64;

    /// A lower bound on the seconds any traversal can take.
    fn time_lower_bound(&self, ctx: &RoutingContext) -> f64;

    /// Traverse using only the lower bounds, ignoring schedules and the
    /// state's particulars.
    fn optimistic_traverse(&self, s0: &State, ctx: &RoutingContext) -> TraversalOutcomes;
}

impl Traversable for Edge {
    fn traverse(&self, s0: &State, ctx: &RoutingContext) -> TraversalOutcomes {
        if self.is_blocked_at(s0.time()) {
            return TraversalOutcomes::Empty;
        }
        match &self.kind {
            EdgeKind::Street(street) => TraversalOutcomes::from_option(traverse_street(self, street, s0, ctx)),
            EdgeKind::Board(board) => traverse_board(self, board, s0, ctx),
            EdgeKind::Alight(alight) => traverse_alight(self, alight, s0, ctx),
            EdgeKind::Hop(hop) => TraversalOutcomes::from_option(traverse_hop(self, hop, s0, ctx)),
            EdgeKind::Dwell(dwell) => TraversalOutcomes::from_option(traverse_dwell(self, dwell, s0, ctx)),
            EdgeKind::FreeConnector => TraversalOutcomes::from_option(StateEditor::new(s0, self).make_state()),
            EdgeKind::Elevator(elevator) => {
                TraversalOutcomes::from_option(traverse_elevator(self, elevator, s0, ctx))
            }
            EdgeKind::Transfer(transfer) => {
                TraversalOutcomes::from_option(traverse_transfer(self, transfer, s0, ctx))
            }
        }
    }

    fn weight_lower_bound(&self, ctx: &RoutingContext) -> f64 {
        let req = &ctx.request;
        match &self.kind {
            EdgeKind::Street(street) => street_lower_bound(street, req, |secs, mode| secs * req.reluctance(mode)),
            EdgeKind::Board(board) => match usable_pattern(ctx, board.pattern) {
                Some(_) => req.board_cost,
                None => f64::INFINITY,
            },
            EdgeKind::Alight(_) => 0.0,
            EdgeKind::Hop(hop) => pattern_bound(ctx, hop.pattern, |p| p.min_hop_secs(hop.stop_index)),
            EdgeKind::Dwell(dwell) => {
                pattern_bound(ctx, dwell.pattern, |p| p.min_dwell_secs(dwell.stop_index))
            }
            EdgeKind::FreeConnector => 0.0,
            EdgeKind::Elevator(elevator) => elevator.travel_secs as f64 + req.elevator_board_cost,
            EdgeKind::Transfer(transfer) => transfer.seconds as f64 * req.walk_reluctance,
        }
    }

    fn time_lower_bound(&self, ctx: &RoutingContext) -> f64 {
        let req = &ctx.request;
        match &self.kind {
            EdgeKind::Street(street) => street_lower_bound(street, req, |secs, _| secs.floor()),
            EdgeKind::Board(_) | EdgeKind::Alight(_) | EdgeKind::FreeConnector => 0.0,
            EdgeKind::Hop(hop) => pattern_bound(ctx, hop.pattern, |p| p.min_hop_secs(hop.stop_index)),
            EdgeKind::Dwell(dwell) => {
                pattern_bound(ctx, dwell.pattern, |p| p.min_dwell_secs(dwell.stop_index))
            }
            EdgeKind::Elevator(elevator) => (elevator.travel_secs + req.elevator_board_time) as f64,
            EdgeKind::Transfer(transfer) => transfer.seconds as f64,
        }
    }

    fn optimistic_traverse(&self, s0: &State, ctx: &RoutingContext) -> TraversalOutcomes {
        let weight = self.weight_lower_bound(ctx);
        if !weight.is_finite() {
            return TraversalOutcomes::Empty;
        }
        let mut editor = StateEditor::new(s0, self);
        editor.increment_time(self.time_lower_bound(ctx) as i64);
        editor.increment_weight(weight);
        TraversalOutcomes::from_option(editor.make_state())
    }
}

/// Speed used on a street edge, in m/s.
fn street_speed(street: &StreetEdge, mode: TraverseMode, req: &RoutingRequest) -> f64 {
    match mode {
        TraverseMode::Car => req.car_speed.min(street.car_speed),
        _ => req.speed(mode),
    }
}

fn street_lower_bound<F>(street: &StreetEdge, req: &RoutingRequest, cost: F) -> f64
where
    F: Fn(f64, TraverseMode) -> f64,
{
    street
        .permission
        .intersection(req.street_modes())
        .iter()
        .map(|mode| cost(street.length_m / street_speed(street, mode, req), mode))
        .fold(f64::INFINITY, f64::min)
}

fn usable_pattern(ctx: &RoutingContext, id: PatternId) -> Option<&TripPattern> {
    let pattern = ctx.graph.pattern(id)?;
    ctx.request.modes.contains(pattern.mode).then_some(pattern)
}

fn pattern_bound<F>(ctx: &RoutingContext, id: PatternId, secs: F) -> f64
where
    F: Fn(&TripPattern) -> i64,
{
    match usable_pattern(ctx, id) {
        Some(pattern) => secs(pattern).max(0) as f64,
        None => f64::INFINITY,
    }
}

fn traverse_street(edge: &Edge, street: &StreetEdge, s0: &State, ctx: &RoutingContext) -> Option<State> {
    let req = &ctx.request;
    let mode = s0.mode();
    if s0.is_on_board() || !mode.is_on_street() {
        return None;
    }
    if !street.permission.contains(mode) || !req.modes.contains(mode) {
        return None;
    }
    if req.wheelchair && !street.wheelchair_accessible {
        return None;
    }

    let speed = street_speed(street, mode, req);
    let secs = street.effective_length_m(mode) / speed;
    let weight = secs * req.reluctance(mode);

    let mut turn_cost = 0.0;
    if let Some(back_edge) = s0.back_edge().and_then(|id| ctx.graph.edge(id))
        && let Some(back_street) = back_edge.as_street()
    {
        let back_speed = street_speed(back_street, mode, req);
        let (intersection, from, to, from_speed, to_speed) = if ctx.is_arrive_by() {
            (edge.to, street, back_street, speed, back_speed)
        } else {
            (edge.from, back_street, street, back_speed, speed)
        };
        if let Some(vertex) = ctx.graph.vertex(intersection) {
            turn_cost = ctx
                .intersection_model
                .traversal_cost(vertex, from, to, mode, from_speed, to_speed)
                * req.turn_cost_factor;
        }
    }

    let mut editor = StateEditor::new(s0, edge);
    editor.increment_time((secs + turn_cost).round() as i64);
    editor.increment_weight(weight + turn_cost);
    if mode.is_walking() {
        editor.increment_walk_distance(street.length_m);
    }
    editor.make_state()
}

/// A trip that can be boarded, with its clock time at the boarding stop.
struct Candidate {
    trip_index: usize,
    service_day: i64,
    time: i64,
}

fn trip_usable(trip: &TripTimes, req: &RoutingRequest) -> bool {
    !req.is_banned(&trip.trip_id) && (!req.wheelchair || trip.wheelchair_accessible)
}

/// Midnights of the service days that can have a trip running at `time`:
/// yesterday (for trips past midnight) and today.
fn service_days(time: i64) -> [i64; 2] {
    let today = time.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
    [today - SECONDS_PER_DAY, today]
}

/// The next `count` departures from `stop_index` at or after `time`.
///
/// Departures past the first stop need not follow trip order, so every
/// trip is considered.
fn next_departures(pattern: &TripPattern, stop_index: usize, time: i64, req: &RoutingRequest) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    for service_day in service_days(time) {
        candidates.extend(
            pattern
                .trips()
                .iter()
                .enumerate()
                .filter(|(_, trip)| trip_usable(trip, req))
                .map(|(trip_index, trip)| Candidate {
                    trip_index,
                    service_day,
                    time: service_day + trip.departures[stop_index],
                })
                .filter(|c| c.time >= time),
        );
    }
    candidates.sort_by_key(|c| (c.time, c.trip_index));
    candidates.truncate(req.board_alternatives);
    candidates
}

/// The last `count` arrivals at `stop_index` at or before `time`.
fn previous_arrivals(pattern: &TripPattern, stop_index: usize, time: i64, req: &RoutingRequest) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    for service_day in service_days(time) {
        candidates.extend(
            pattern
                .trips()
                .iter()
                .enumerate()
                .rev()
                .filter(|(_, trip)| trip_usable(trip, req))
                .map(|(trip_index, trip)| Candidate {
                    trip_index,
                    service_day,
                    time: service_day + trip.arrivals[stop_index],
                })
                .filter(|c| c.time <= time)
                .take(req.board_alternatives),
        );
    }
    candidates.sort_by_key(|c| (std::cmp::Reverse(c.time), c.trip_index));
    candidates.truncate(req.board_alternatives);
    candidates
}

fn stop_allows_wheelchair(ctx: &RoutingContext, stop: VertexId) -> bool {
    match ctx.graph.vertex(stop).map(|v| &v.kind) {
        Some(VertexKind::TransitStop {
            wheelchair_boarding,
            ..
        }) => *wheelchair_boarding,
        _ => true,
    }
}

fn stop_zone(ctx: &RoutingContext, stop: VertexId) -> Option<Arc<str>> {
    ctx.graph.vertex(stop).and_then(|v| v.zone().cloned())
}

/// Whether an initial wait is longer than the request allows.
fn initial_wait_too_long(s0: &State, wait: i64, req: &RoutingRequest) -> bool {
    s0.boardings() == 0 && req.clamp_initial_wait_secs.is_some_and(|clamp| wait > clamp)
}

fn boarding_weight(s0: &State, req: &RoutingRequest) -> f64 {
    if s0.boardings() > 0 {
        req.board_cost + req.transfer_penalty
    } else {
        req.board_cost
    }
}

fn on_pattern_trip<'p>(s0: &State, pattern: &'p TripPattern) -> Option<(TripRef, &'p TripTimes)> {
    let trip = s0.trip()?;
    if trip.pattern != pattern.id {
        return None;
    }
    Some((trip, pattern.trip(trip.trip_index)?))
}

fn traverse_board(edge: &Edge, board: &BoardEdge, s0: &State, ctx: &RoutingContext) -> TraversalOutcomes {
    let req = &ctx.request;
    let Some(pattern) = usable_pattern(ctx, board.pattern) else {
        return TraversalOutcomes::Empty;
    };
    let stop = edge.from;
    if req.wheelchair && !stop_allows_wheelchair(ctx, stop) {
        return TraversalOutcomes::Empty;
    }
    let zone = stop_zone(ctx, stop);

    if ctx.is_arrive_by() {
        // Backwards off the vehicle onto the stop; the wait was counted when
        // the reverse search stepped on board at the alighting stop.
        if on_pattern_trip(s0, pattern).is_none() {
            return TraversalOutcomes::Empty;
        }
        let mut editor = StateEditor::new(s0, edge);
        editor.increment_weight(boarding_weight(s0, req));
        editor.increment_boardings();
        editor.leave_vehicle();
        editor.add_route(&pattern.route_id);
        if let Some(zone) = &zone {
            editor.add_zone(zone);
        }
        return TraversalOutcomes::from_option(editor.make_state());
    }

    if s0.is_on_board() || !s0.mode().is_walking() {
        return TraversalOutcomes::Empty;
    }
    let states = next_departures(pattern, board.stop_index, s0.time(), req)
        .into_iter()
        .filter_map(|candidate| {
            let wait = candidate.time - s0.time();
            if initial_wait_too_long(s0, wait, req) {
                return None;
            }
            let mut editor = StateEditor::new(s0, edge);
            editor.increment_time(wait);
            editor.increment_weight(wait as f64 * req.wait_reluctance + boarding_weight(s0, req));
            editor.increment_boardings();
            editor.enter_vehicle(
                TripRef {
                    pattern: pattern.id,
                    trip_index: candidate.trip_index,
                    service_day: candidate.service_day,
                },
                pattern.mode,
            );
            editor.add_route(&pattern.route_id);
            if let Some(zone) = &zone {
                editor.add_zone(zone);
            }
            editor.make_state()
        })
        .collect();
    TraversalOutcomes::from_vec(states)
}

fn traverse_alight(edge: &Edge, alight: &AlightEdge, s0: &State, ctx: &RoutingContext) -> TraversalOutcomes {
    let req = &ctx.request;
    let Some(pattern) = usable_pattern(ctx, alight.pattern) else {
        return TraversalOutcomes::Empty;
    };
    let stop = edge.to;
    if req.wheelchair && !stop_allows_wheelchair(ctx, stop) {
        return TraversalOutcomes::Empty;
    }
    let zone = stop_zone(ctx, stop);

    if !ctx.is_arrive_by() {
        if on_pattern_trip(s0, pattern).is_none() {
            return TraversalOutcomes::Empty;
        }
        let mut editor = StateEditor::new(s0, edge);
        editor.leave_vehicle();
        if let Some(zone) = &zone {
            editor.add_zone(zone);
        }
        return TraversalOutcomes::from_option(editor.make_state());
    }

    // Backwards from the stop onto the latest trip arriving in time.
    if s0.is_on_board() || !s0.mode().is_walking() {
        return TraversalOutcomes::Empty;
    }
    let states = previous_arrivals(pattern, alight.stop_index, s0.time(), req)
        .into_iter()
        .filter_map(|candidate| {
            let wait = s0.time() - candidate.time;
            if initial_wait_too_long(s0, wait, req) {
                return None;
            }
            let mut editor = StateEditor::new(s0, edge);
            editor.increment_time(wait);
            editor.increment_weight(wait as f64 * req.wait_reluctance);
            editor.enter_vehicle(
                TripRef {
                    pattern: pattern.id,
                    trip_index: candidate.trip_index,
                    service_day: candidate.service_day,
                },
                pattern.mode,
            );
            if let Some(zone) = &zone {
                editor.add_zone(zone);
            }
            editor.make_state()
        })
        .collect();
    TraversalOutcomes::from_vec(states)
}

fn traverse_hop(edge: &Edge, hop: &HopEdge, s0: &State, ctx: &RoutingContext) -> Option<State> {
    let pattern = usable_pattern(ctx, hop.pattern)?;
    let (trip_ref, trip) = on_pattern_trip(s0, pattern)?;
    let departure = trip_ref.service_day + trip.departures[hop.stop_index];
    let arrival = trip_ref.service_day + trip.arrivals[hop.stop_index + 1];
    let secs = if ctx.is_arrive_by() {
        s0.time() - departure
    } else {
        arrival - s0.time()
    };
    let mut editor = StateEditor::new(s0, edge);
    editor.increment_time(secs);
    editor.increment_weight(secs as f64);
    editor.make_state()
}

fn traverse_dwell(edge: &Edge, dwell: &DwellEdge, s0: &State, ctx: &RoutingContext) -> Option<State> {
    let pattern = usable_pattern(ctx, dwell.pattern)?;
    let (trip_ref, trip) = on_pattern_trip(s0, pattern)?;
    let arrival = trip_ref.service_day + trip.arrivals[dwell.stop_index];
    let departure = trip_ref.service_day + trip.departures[dwell.stop_index];
    let secs = if ctx.is_arrive_by() {
        s0.time() - arrival
    } else {
        departure - s0.time()
    };
    let mut editor = StateEditor::new(s0, edge);
    editor.increment_time(secs);
    editor.increment_weight(secs as f64);
    editor.make_state()
}

fn traverse_elevator(edge: &Edge, elevator: &ElevatorEdge, s0: &State, ctx: &RoutingContext) -> Option<State> {
    let req = &ctx.request;
    if s0.is_on_board() || !elevator.permission.contains(s0.mode()) {
        return None;
    }
    let mut editor = StateEditor::new(s0, edge);
    editor.increment_time(elevator.travel_secs + req.elevator_board_time);
    editor.increment_weight(elevator.travel_secs as f64 + req.elevator_board_cost);
    editor.make_state()
}

fn traverse_transfer(edge: &Edge, transfer: &TransferEdge, s0: &State, ctx: &RoutingContext) -> Option<State> {
    let req = &ctx.request;
    if s0.is_on_board() || !s0.mode().is_walking() {
        return None;
    }
    if req.wheelchair && !transfer.wheelchair_accessible {
        return None;
    }
    let mut editor = StateEditor::new(s0, edge);
    editor.increment_time(transfer.seconds);
    editor.increment_weight(transfer.seconds as f64 * req.walk_reluctance);
    editor.increment_walk_distance(transfer.distance_m);
    editor.make_state()
}
