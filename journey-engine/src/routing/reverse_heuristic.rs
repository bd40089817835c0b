//! Heuristic backed by a reverse search over edge lower bounds.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::graph::VertexId;

use super::context::RoutingContext;
use super::heuristic::{HeuristicError, RemainingWeightHeuristic};
use super::state::State;
use super::traverse::Traversable;

/// Lower bounds from a Dijkstra search run backwards from the target.
///
/// Edge costs are the edges' weight lower bounds, so a settled vertex's
/// distance is a valid estimate. The search is interleaved with the main
/// search through [`do_some_work`](RemainingWeightHeuristic::do_some_work).
/// Vertices not settled yet are at least as far as the last one settled.
#[derive(Debug)]
pub struct ReverseSearchHeuristic {
    work_batch: usize,
    settled: HashMap<VertexId, f64>,
    frontier: BinaryHeap<Reverse<(OrderedFloat<f64>, VertexId)>>,
    radius: f64,
    exhausted: bool,
}

impl ReverseSearchHeuristic {
    pub fn new(work_batch: usize) -> Self {
        Self {
            work_batch: work_batch.max(1),
            settled: HashMap::new(),
            frontier: BinaryHeap::new(),
            radius: 0.0,
            exhausted: false,
        }
    }

    /// Settle up to `limit` more vertices.
    fn expand(&mut self, ctx: &RoutingContext, limit: usize) {
        let mut count = 0;
        while count < limit {
            let Some(Reverse((OrderedFloat(weight), vertex))) = self.frontier.pop() else {
                self.exhausted = true;
                return;
            };
            if self.settled.contains_key(&vertex) {
                continue;
            }
            self.settled.insert(vertex, weight);
            self.radius = weight;
            count += 1;

            // Towards the target means against the search direction.
            let neighbours: Vec<(VertexId, f64)> = if ctx.is_arrive_by() {
                ctx.graph
                    .outgoing(vertex)
                    .map(|e| (e.to, e.weight_lower_bound(ctx)))
                    .collect()
            } else {
                ctx.graph
                    .incoming(vertex)
                    .map(|e| (e.from, e.weight_lower_bound(ctx)))
                    .collect()
            };
            for (next, cost) in neighbours {
                if cost.is_finite() && !self.settled.contains_key(&next) {
                    self.frontier.push(Reverse((OrderedFloat(weight + cost), next)));
                }
            }
        }
    }

    fn bound(&self, vertex: VertexId) -> f64 {
        match self.settled.get(&vertex) {
            Some(weight) => *weight,
            None if self.exhausted => f64::INFINITY,
            None => self.radius,
        }
    }
}

impl RemainingWeightHeuristic for ReverseSearchHeuristic {
    fn initialize(
        &mut self,
        origin: &State,
        target: VertexId,
        ctx: &RoutingContext,
        abort_deadline: Option<Instant>,
    ) -> Result<(), HeuristicError> {
        if ctx.graph.vertex(target).is_none() {
            return Err(HeuristicError::UnknownTarget(target));
        }
        self.reset();
        self.frontier.push(Reverse((OrderedFloat(0.0), target)));

        while !self.exhausted && !self.settled.contains_key(&origin.vertex()) {
            if abort_deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                self.reset();
                return Err(HeuristicError::DeadlineExceeded);
            }
            self.expand(ctx, self.work_batch);
        }
        debug!(
            settled = self.settled.len(),
            radius = self.radius,
            "reverse heuristic initialized"
        );
        Ok(())
    }

    fn estimate_forward(&self, state: &State, _ctx: &RoutingContext) -> f64 {
        self.bound(state.vertex())
    }

    fn estimate_reverse(&self, state: &State, _ctx: &RoutingContext) -> f64 {
        self.bound(state.vertex())
    }

    fn do_some_work(&mut self, ctx: &RoutingContext) {
        if !self.exhausted {
            self.expand(ctx, self.work_batch);
        }
    }

    fn reset(&mut self) {
        self.settled.clear();
        self.frontier.clear();
        self.radius = 0.0;
        self.exhausted = false;
    }
}
