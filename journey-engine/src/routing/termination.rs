//! When a search stops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::graph::VertexId;

use super::request::RoutingRequest;
use super::spt::ShortestPathTree;
use super::state::State;

/// Consulted after every dequeued state.
pub trait SearchTerminationStrategy: Send + Sync {
    fn should_terminate(
        &self,
        origin: VertexId,
        target: Option<VertexId>,
        current: &State,
        spt: &ShortestPathTree,
        request: &RoutingRequest,
    ) -> bool;
}

/// Stop when a state at the target comes out of the queue and the tree
/// holds at least `count` states there.
///
/// States come out of the queue in key order, so with an admissible
/// heuristic the first one out is the best path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAfterPaths {
    pub count: usize,
}

impl SearchTerminationStrategy for StopAfterPaths {
    fn should_terminate(
        &self,
        _origin: VertexId,
        target: Option<VertexId>,
        current: &State,
        spt: &ShortestPathTree,
        _request: &RoutingRequest,
    ) -> bool {
        match target {
            Some(target) => current.vertex() == target && spt.states_at(target).len() >= self.count,
            None => false,
        }
    }
}

/// Run until the queue is empty or the deadline passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverTerminate;

impl SearchTerminationStrategy for NeverTerminate {
    fn should_terminate(
        &self,
        _origin: VertexId,
        _target: Option<VertexId>,
        _current: &State,
        _spt: &ShortestPathTree,
        _request: &RoutingRequest,
    ) -> bool {
        false
    }
}

/// Cooperative cancellation shared between a search and whoever started it.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
