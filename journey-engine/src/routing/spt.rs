//! Shortest-path trees and dominance rules.

use std::collections::HashMap;

use crate::graph::VertexId;

use super::path::GraphPath;
use super::state::State;

/// Decides whether one state at a vertex makes another redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominanceFunction {
    /// Keep every state not beaten on weight, time, walking and boardings.
    ///
    /// States on different trips, or in different modes, never dominate
    /// each other.
    Pareto,
    /// Keep only the lowest-weight state per vertex.
    MinimumWeight,
    /// Keep only the earliest (latest, for arrive-by) state per vertex.
    EarliestArrival,
}

impl DominanceFunction {
    /// Whether `a` is at least as good as `b` in every tracked dimension.
    ///
    /// Ties count as domination, so an equal state arriving later is
    /// rejected.
    pub fn dominates(self, a: &State, b: &State) -> bool {
        match self {
            DominanceFunction::Pareto => {
                if a.trip() != b.trip() || a.mode() != b.mode() {
                    return false;
                }
                a.weight() <= b.weight()
                    && a.time_not_worse_than(b)
                    && a.walk_distance() <= b.walk_distance()
                    && a.boardings() <= b.boardings()
            }
            DominanceFunction::MinimumWeight => a.weight() <= b.weight(),
            DominanceFunction::EarliestArrival => a.time_not_worse_than(b),
        }
    }
}

/// Non-dominated states per vertex for one search.
#[derive(Debug)]
pub struct ShortestPathTree {
    dominance: DominanceFunction,
    states: HashMap<VertexId, Vec<State>>,
}

impl ShortestPathTree {
    pub fn new(dominance: DominanceFunction) -> Self {
        Self {
            dominance,
            states: HashMap::new(),
        }
    }

    pub fn dominance(&self) -> DominanceFunction {
        self.dominance
    }

    /// Insert `state` unless an existing state at its vertex dominates it.
    ///
    /// States the new one dominates are dropped. Returns whether the state
    /// was accepted.
    pub fn add(&mut self, state: State) -> bool {
        let dominance = self.dominance;
        let existing = self.states.entry(state.vertex()).or_default();
        if existing.iter().any(|old| dominance.dominates(old, &state)) {
            return false;
        }
        existing.retain(|old| !dominance.dominates(&state, old));
        existing.push(state);
        true
    }

    /// Whether a dequeued state is still worth expanding, i.e. nothing has
    /// displaced it since it was added.
    pub fn visit(&self, state: &State) -> bool {
        self.states
            .get(&state.vertex())
            .is_some_and(|states| states.iter().any(|s| s.same_as(state)))
    }

    /// Accepted states at `vertex`, in insertion order.
    pub fn states_at(&self, vertex: VertexId) -> &[State] {
        self.states.get(&vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every accepted path to `vertex`, lowest weight first.
    pub fn get_paths(&self, vertex: VertexId) -> Vec<GraphPath> {
        let mut states: Vec<&State> = self.states_at(vertex).iter().collect();
        states.sort_by(|a, b| a.weight().total_cmp(&b.weight()));
        states.into_iter().map(GraphPath::from_state).collect()
    }

    /// The lowest-weight path to `vertex`.
    pub fn get_path(&self, vertex: VertexId) -> Option<GraphPath> {
        self.best_state(vertex).map(GraphPath::from_state)
    }

    /// Lowest-weight state at `vertex`; earlier insertion wins ties.
    pub fn best_state(&self, vertex: VertexId) -> Option<&State> {
        self.states_at(vertex)
            .iter()
            .reduce(|best, s| if s.weight() < best.weight() { s } else { best })
    }

    /// Reached vertices in id order.
    pub fn reached_vertices(&self) -> Vec<VertexId> {
        let mut vertices: Vec<VertexId> = self
            .states
            .iter()
            .filter(|(_, states)| !states.is_empty())
            .map(|(v, _)| *v)
            .collect();
        vertices.sort();
        vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.states.values().filter(|s| !s.is_empty()).count()
    }

    pub fn state_count(&self) -> usize {
        self.states.values().map(Vec::len).sum()
    }
}
