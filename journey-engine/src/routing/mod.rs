//! Journey search over a network snapshot.
//!
//! A [`RoutingRequest`] is bound to a snapshot in a [`RoutingContext`], then
//! explored by a label-correcting [`Search`]. Each edge extends immutable
//! [`State`]s through the [`Traversable`] cost model; accepted states end up
//! in a [`ShortestPathTree`] from which [`GraphPath`]s are read.

mod context;
mod editor;
mod heuristic;
mod path;
mod path_finder;
mod queue;
mod request;
mod reverse_heuristic;
mod search;
mod spt;
mod state;
mod termination;
mod traverse;
mod turn_cost;
mod visitor;

#[cfg(test)]
mod search_tests;

pub use context::{DEFAULT_BATCH_MAX_DURATION_SECS, RoutingContext, SearchMode, resolve};
pub use editor::StateEditor;
pub use heuristic::{
    DefaultHeuristicFactory, EuclideanHeuristic, HeuristicError, HeuristicFactory,
    ModeAwareHeuristicFactory, RemainingWeightHeuristic, TrivialHeuristic, min_weight_per_meter,
};
pub use path::GraphPath;
pub use path_finder::{PathFinder, PlanResult};
pub use request::{Location, RequestError, RoutingRequest};
pub use reverse_heuristic::ReverseSearchHeuristic;
pub use search::{DEFAULT_WORK_INTERVAL, Search, SearchResult, earliest_arrival, search};
pub use spt::{DominanceFunction, ShortestPathTree};
pub use state::{FareContext, State, TripRef};
pub use termination::{CancellationFlag, NeverTerminate, SearchTerminationStrategy, StopAfterPaths};
pub use traverse::{Traversable, TraversalOutcomes};
pub use turn_cost::{
    IntersectionCostModel, SimpleIntersectionCostModel, TurnDirection, turn_angle, turn_direction,
};
pub use visitor::{CountingVisitor, TraverseVisitor};
