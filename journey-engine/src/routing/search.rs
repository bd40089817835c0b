//! Label-correcting search.
//!
//! A generalization of Dijkstra (and A*, given a heuristic) to several
//! competing states per vertex. States come out of a priority queue, pass
//! the shortest-path tree's dominance gate, and are expanded across every
//! edge in the search direction. Children that survive pruning and are not
//! dominated go back into the queue.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::graph::{Graph, VertexId};

use super::context::{RoutingContext, SearchMode};
use super::heuristic::{EuclideanHeuristic, RemainingWeightHeuristic};
use super::path::GraphPath;
use super::queue::SearchQueue;
use super::request::{RequestError, RoutingRequest};
use super::spt::{DominanceFunction, ShortestPathTree};
use super::state::State;
use super::termination::{CancellationFlag, NeverTerminate, SearchTerminationStrategy, StopAfterPaths};
use super::traverse::Traversable;
use super::visitor::TraverseVisitor;

/// Dequeues between two calls to the heuristic's `do_some_work`.
pub const DEFAULT_WORK_INTERVAL: usize = 64;

/// Outcome of one search.
#[derive(Debug)]
pub struct SearchResult {
    pub spt: ShortestPathTree,
    /// The deadline passed or the search was cancelled. The tree holds
    /// whatever was found until then.
    pub aborted: bool,
    /// States dequeued and expanded.
    pub visited: usize,
    pub origin: VertexId,
    pub target: Option<VertexId>,
}

impl SearchResult {
    /// Best path to the target of a goal-directed search.
    pub fn best_path(&self) -> Option<GraphPath> {
        self.target.and_then(|t| self.spt.get_path(t))
    }
}

/// A configured search over one routing context.
///
/// Goal-directed contexts default to Pareto dominance and stop at the first
/// path to the target; batch contexts default to earliest-arrival dominance
/// and run until the queue is empty.
pub struct Search<'a> {
    ctx: &'a RoutingContext,
    heuristic: Option<&'a mut dyn RemainingWeightHeuristic>,
    termination: &'a dyn SearchTerminationStrategy,
    dominance: DominanceFunction,
    deadline: Option<Instant>,
    cancellation: Option<CancellationFlag>,
    visitor: Option<&'a mut dyn TraverseVisitor>,
    work_interval: usize,
}

impl<'a> Search<'a> {
    pub fn new(ctx: &'a RoutingContext) -> Self {
        let termination: &'a dyn SearchTerminationStrategy = match ctx.mode {
            SearchMode::GoalDirected => &StopAfterPaths { count: 1 },
            SearchMode::Batch => &NeverTerminate,
        };
        let dominance = match ctx.mode {
            SearchMode::GoalDirected => DominanceFunction::Pareto,
            SearchMode::Batch => DominanceFunction::EarliestArrival,
        };
        Self {
            ctx,
            heuristic: None,
            termination,
            dominance,
            deadline: None,
            cancellation: None,
            visitor: None,
            work_interval: DEFAULT_WORK_INTERVAL,
        }
    }

    /// Order goal-directed search by weight plus this heuristic's estimate.
    /// Ignored in batch mode.
    pub fn heuristic(mut self, heuristic: &'a mut dyn RemainingWeightHeuristic) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    pub fn termination(mut self, termination: &'a dyn SearchTerminationStrategy) -> Self {
        self.termination = termination;
        self
    }

    pub fn dominance(mut self, dominance: DominanceFunction) -> Self {
        self.dominance = dominance;
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn visitor(mut self, visitor: &'a mut dyn TraverseVisitor) -> Self {
        self.visitor = Some(visitor);
        self
    }

    pub fn work_interval(mut self, dequeues: usize) -> Self {
        self.work_interval = dequeues.max(1);
        self
    }

    pub fn run(self) -> SearchResult {
        let Search {
            ctx,
            mut heuristic,
            termination,
            dominance,
            deadline,
            cancellation,
            mut visitor,
            work_interval,
        } = self;

        let initial = State::initial(ctx);

        let heuristic_ready = match (heuristic.as_deref_mut(), ctx.target, ctx.mode) {
            (Some(h), Some(target), SearchMode::GoalDirected) => {
                match h.initialize(&initial, target, ctx, deadline) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(%err, "heuristic setup failed, searching without one");
                        false
                    }
                }
            }
            _ => false,
        };
        if !heuristic_ready {
            heuristic = None;
        }

        let mut spt = ShortestPathTree::new(dominance);
        let mut queue = SearchQueue::new();
        let key = priority(ctx, heuristic.as_deref(), &initial);
        spt.add(initial.clone());
        queue.push(initial, key);

        let mut visited = 0;
        let mut aborted = false;

        while let Some((state, _)) = queue.pop() {
            let cancelled = cancellation.as_ref().is_some_and(CancellationFlag::is_cancelled);
            if cancelled || deadline.is_some_and(|d| Instant::now() >= d) {
                aborted = true;
                debug!(visited, queued = queue.len(), cancelled, "search aborted");
                break;
            }
            if !spt.visit(&state) {
                continue;
            }
            visited += 1;
            if let Some(v) = visitor.as_deref_mut() {
                v.visit_vertex(&state);
            }
            if termination.should_terminate(ctx.origin, ctx.target, &state, &spt, &ctx.request) {
                break;
            }
            if visited % work_interval == 0
                && let Some(h) = heuristic.as_deref_mut()
            {
                h.do_some_work(ctx);
            }

            let vertex = state.vertex();
            let forward = (!ctx.is_arrive_by()).then(|| ctx.graph.outgoing(vertex));
            let backward = ctx.is_arrive_by().then(|| ctx.graph.incoming(vertex));
            for edge in forward.into_iter().flatten().chain(backward.into_iter().flatten()) {
                for child in edge.traverse(&state, ctx) {
                    if let Some(v) = visitor.as_deref_mut() {
                        v.visit_edge(edge, &child);
                    }
                    if ctx.rejects(&child) {
                        continue;
                    }
                    let key = priority(ctx, heuristic.as_deref(), &child);
                    if !key.is_finite() {
                        continue;
                    }
                    if spt.add(child.clone()) {
                        if let Some(v) = visitor.as_deref_mut() {
                            v.visit_enqueue(&child);
                        }
                        queue.push(child, key);
                    }
                }
            }
        }

        debug!(
            visited,
            states = spt.state_count(),
            vertices = spt.vertex_count(),
            aborted,
            "search finished"
        );

        SearchResult {
            spt,
            aborted,
            visited,
            origin: ctx.origin,
            target: ctx.target,
        }
    }
}

/// Queue key: elapsed seconds in batch mode, weight plus estimate otherwise.
fn priority(ctx: &RoutingContext, heuristic: Option<&dyn RemainingWeightHeuristic>, state: &State) -> f64 {
    match ctx.mode {
        SearchMode::Batch => state.elapsed_secs() as f64,
        SearchMode::GoalDirected => {
            state.weight() + heuristic.map_or(0.0, |h| h.estimate(state, ctx))
        }
    }
}

/// Goal-directed search between the request's locations using the
/// Euclidean heuristic.
pub fn search(graph: Arc<Graph>, request: &RoutingRequest) -> Result<SearchResult, RequestError> {
    let ctx = RoutingContext::goal_directed(graph, request)?;
    let mut heuristic = EuclideanHeuristic::new();
    Ok(Search::new(&ctx).heuristic(&mut heuristic).run())
}

/// Earliest arrival at every vertex reachable from the request's origin.
///
/// Transfer and walking limits are ignored; the request's maximum duration
/// (two hours if unset) bounds the search instead.
pub fn earliest_arrival(graph: Arc<Graph>, request: &RoutingRequest) -> Result<SearchResult, RequestError> {
    let ctx = RoutingContext::batch(graph, request)?;
    Ok(Search::new(&ctx).run())
}
