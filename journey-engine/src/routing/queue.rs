//! Min-priority queue of states.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::state::State;

struct Entry {
    key: OrderedFloat<f64>,
    seq: u64,
    state: State,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    // Reversed so the max-heap pops the smallest key; equal keys pop in
    // insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// States waiting to be expanded, smallest key first.
///
/// Several entries for one vertex are normal; stale ones are filtered by the
/// shortest-path tree when they come out.
#[derive(Default)]
pub(crate) struct SearchQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl SearchQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, state: State, key: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            key: OrderedFloat(key),
            seq,
            state,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<(State, f64)> {
        self.heap.pop().map(|e| (e.state, e.key.into_inner()))
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::TraverseMode;
    use crate::graph::VertexId;
    use crate::routing::state::{FareContext, StateData};

    fn at_vertex(id: u32) -> State {
        State(Arc::new(StateData {
            vertex: VertexId(id),
            back_edge: None,
            back_state: None,
            time: 0,
            start_time: 0,
            weight: 0.0,
            walk_distance: 0.0,
            mode: TraverseMode::Walk,
            street_mode: TraverseMode::Walk,
            boardings: 0,
            trip: None,
            fare: Arc::new(FareContext::default()),
            arrive_by: false,
        }))
    }

    #[test]
    fn smallest_key_first_then_insertion_order() {
        let mut queue = SearchQueue::new();
        queue.push(at_vertex(0), 5.0);
        queue.push(at_vertex(1), 2.0);
        queue.push(at_vertex(2), 5.0);
        queue.push(at_vertex(3), 2.0);
        assert_eq!(queue.len(), 4);

        let order: Vec<(u32, f64)> = std::iter::from_fn(|| queue.pop())
            .map(|(s, key)| (s.vertex().0, key))
            .collect();
        assert_eq!(order, vec![(1, 2.0), (3, 2.0), (0, 5.0), (2, 5.0)]);
    }
}
