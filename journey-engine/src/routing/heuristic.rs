//! Remaining-weight heuristics for goal-directed search.
//!
//! A heuristic estimates the weight still to pay from a state to the
//! search target. Estimates must never exceed the true remaining weight,
//! otherwise the first path found to the target may not be the best.

use std::time::Instant;

use crate::config::EngineConfig;
use crate::domain::Coordinate;
use crate::graph::VertexId;

use super::context::RoutingContext;
use super::request::RoutingRequest;
use super::reverse_heuristic::ReverseSearchHeuristic;
use super::state::State;

/// Why a heuristic could not be set up. The search then runs without one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeuristicError {
    /// The target is not in the snapshot
    #[error("target {0:?} is not in the network")]
    UnknownTarget(VertexId),

    /// Setup ran past its deadline
    #[error("heuristic setup ran past its deadline")]
    DeadlineExceeded,
}

/// An admissible lower bound on the remaining weight to the target.
pub trait RemainingWeightHeuristic: Send {
    /// One-time setup before a search. `origin` is the search's initial
    /// state and `target` where it is heading.
    fn initialize(
        &mut self,
        origin: &State,
        target: VertexId,
        ctx: &RoutingContext,
        abort_deadline: Option<Instant>,
    ) -> Result<(), HeuristicError>;

    /// Lower bound for a depart-at search.
    fn estimate_forward(&self, state: &State, ctx: &RoutingContext) -> f64;

    /// Lower bound for an arrive-by search, heading back to the origin.
    fn estimate_reverse(&self, state: &State, ctx: &RoutingContext) -> f64;

    /// Estimate in the context's direction.
    fn estimate(&self, state: &State, ctx: &RoutingContext) -> f64 {
        if ctx.is_arrive_by() {
            self.estimate_reverse(state, ctx)
        } else {
            self.estimate_forward(state, ctx)
        }
    }

    /// Refine bounds a little. Called periodically by the search loop.
    fn do_some_work(&mut self, _ctx: &RoutingContext) {}

    /// Forget everything learned, ready for a new round.
    fn reset(&mut self) {}
}

/// Always zero. Turns the search into plain Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialHeuristic;

impl RemainingWeightHeuristic for TrivialHeuristic {
    fn initialize(
        &mut self,
        _origin: &State,
        _target: VertexId,
        _ctx: &RoutingContext,
        _abort_deadline: Option<Instant>,
    ) -> Result<(), HeuristicError> {
        Ok(())
    }

    fn estimate_forward(&self, _state: &State, _ctx: &RoutingContext) -> f64 {
        0.0
    }

    fn estimate_reverse(&self, _state: &State, _ctx: &RoutingContext) -> f64 {
        0.0
    }
}

/// Straight-line distance to the target at the cheapest weight per meter
/// any allowed mode can achieve.
#[derive(Debug, Clone, Default)]
pub struct EuclideanHeuristic {
    target: Option<Coordinate>,
    weight_per_meter: f64,
}

impl EuclideanHeuristic {
    pub fn new() -> Self {
        Self::default()
    }

    fn estimate_from(&self, state: &State, ctx: &RoutingContext) -> f64 {
        let Some(target) = self.target else {
            return 0.0;
        };
        match ctx.graph.vertex(state.vertex()) {
            Some(vertex) => vertex.coordinate.distance_to(&target) * self.weight_per_meter,
            None => 0.0,
        }
    }
}

/// Lowest weight one meter of straight-line progress can cost.
///
/// Street weight is seconds times reluctance; transit weight is seconds, at
/// most `max_transit_speed` meters per second.
pub fn min_weight_per_meter(request: &RoutingRequest) -> f64 {
    let street_modes = request.street_modes();
    let street = street_modes
        .iter()
        .map(|mode| request.reluctance(mode) / request.speed(mode));
    let transit = request
        .modes
        .has_transit()
        .then(|| 1.0 / request.max_transit_speed);
    let min = street.chain(transit).fold(f64::INFINITY, f64::min);
    if min.is_finite() { min } else { 0.0 }
}

impl RemainingWeightHeuristic for EuclideanHeuristic {
    fn initialize(
        &mut self,
        _origin: &State,
        target: VertexId,
        ctx: &RoutingContext,
        _abort_deadline: Option<Instant>,
    ) -> Result<(), HeuristicError> {
        let vertex = ctx
            .graph
            .vertex(target)
            .ok_or(HeuristicError::UnknownTarget(target))?;
        self.target = Some(vertex.coordinate);
        self.weight_per_meter = min_weight_per_meter(&ctx.request);
        Ok(())
    }

    fn estimate_forward(&self, state: &State, ctx: &RoutingContext) -> f64 {
        self.estimate_from(state, ctx)
    }

    fn estimate_reverse(&self, state: &State, ctx: &RoutingContext) -> f64 {
        self.estimate_from(state, ctx)
    }

    fn reset(&mut self) {
        self.target = None;
    }
}

/// Picks a heuristic for a request.
pub trait HeuristicFactory: Send + Sync {
    fn heuristic_for(&self, request: &RoutingRequest) -> Box<dyn RemainingWeightHeuristic>;
}

/// Euclidean for every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHeuristicFactory;

impl HeuristicFactory for DefaultHeuristicFactory {
    fn heuristic_for(&self, _request: &RoutingRequest) -> Box<dyn RemainingWeightHeuristic> {
        Box::new(EuclideanHeuristic::new())
    }
}

/// Reverse search for transit requests, where straight-line bounds are weak;
/// Euclidean for street-only ones.
#[derive(Debug, Clone, Copy)]
pub struct ModeAwareHeuristicFactory {
    /// Vertices settled per unit of interleaved work.
    pub work_batch: usize,
}

impl ModeAwareHeuristicFactory {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            work_batch: config.heuristic_work_batch,
        }
    }
}

impl Default for ModeAwareHeuristicFactory {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl HeuristicFactory for ModeAwareHeuristicFactory {
    fn heuristic_for(&self, request: &RoutingRequest) -> Box<dyn RemainingWeightHeuristic> {
        if request.modes.has_transit() {
            Box::new(ReverseSearchHeuristic::new(self.work_batch))
        } else {
            Box::new(EuclideanHeuristic::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TraverseMode, TraverseModeSet};

    #[test]
    fn walking_bound_uses_reluctance_over_speed() {
        let req = RoutingRequest {
            modes: TraverseModeSet::of(&[TraverseMode::Walk]),
            walk_speed: 1.0,
            walk_reluctance: 2.0,
            ..RoutingRequest::default()
        };
        assert_eq!(min_weight_per_meter(&req), 2.0);
    }

    #[test]
    fn mode_aware_factory_takes_its_batch_from_config() {
        let config = EngineConfig {
            heuristic_work_batch: 16,
            ..EngineConfig::default()
        };
        assert_eq!(ModeAwareHeuristicFactory::from_config(&config).work_batch, 16);
        assert_eq!(
            ModeAwareHeuristicFactory::default().work_batch,
            EngineConfig::default().heuristic_work_batch
        );
    }

    #[test]
    fn transit_bound_uses_max_transit_speed() {
        let req = RoutingRequest {
            max_transit_speed: 50.0,
            ..RoutingRequest::default()
        };
        assert_eq!(min_weight_per_meter(&req), 1.0 / 50.0);
    }
}
