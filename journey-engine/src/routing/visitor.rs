//! Hooks for watching a search.

use crate::graph::Edge;

use super::state::State;

/// Observes a search as it runs. All hooks default to doing nothing.
pub trait TraverseVisitor {
    /// `edge` was traversed and produced `state`, before any pruning.
    fn visit_edge(&mut self, _edge: &Edge, _state: &State) {}

    /// `state` was dequeued and passed the dominance gate.
    fn visit_vertex(&mut self, _state: &State) {}

    /// `state` was accepted into the tree and queued.
    fn visit_enqueue(&mut self, _state: &State) {}
}

/// Counts hook calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingVisitor {
    pub edges: usize,
    pub vertices: usize,
    pub enqueued: usize,
}

impl TraverseVisitor for CountingVisitor {
    fn visit_edge(&mut self, _edge: &Edge, _state: &State) {
        self.edges += 1;
    }

    fn visit_vertex(&mut self, _state: &State) {
        self.vertices += 1;
    }

    fn visit_enqueue(&mut self, _state: &State) {
        self.enqueued += 1;
    }
}
