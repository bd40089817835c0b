//! Immutable network snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use super::edge::{Edge, EdgeId};
use super::pattern::{PatternId, TripPattern};
use super::vertex::{Vertex, VertexId};

/// A published, immutable network snapshot.
///
/// Vertices, edges and patterns live in arenas addressed by stable ids.
/// Entries are shared `Arc`s so an editor can clone the arenas cheaply and
/// replace only what it touches. A removed entry leaves an empty slot; ids
/// are never reused.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) generation: u64,
    pub(crate) vertices: Vec<Option<Arc<Vertex>>>,
    pub(crate) edges: Vec<Option<Arc<Edge>>>,
    pub(crate) patterns: Vec<Option<Arc<TripPattern>>>,
    pub(crate) labels: HashMap<Arc<str>, VertexId>,
}

impl Graph {
    /// An empty graph at generation zero.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of successful edits applied since the empty graph.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())?.as_deref()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())?.as_deref()
    }

    pub fn pattern(&self, id: PatternId) -> Option<&TripPattern> {
        self.patterns.get(id.index())?.as_deref()
    }

    pub fn vertex_by_label(&self, label: &str) -> Option<&Vertex> {
        self.labels.get(label).and_then(|id| self.vertex(*id))
    }

    /// Edges leaving `id`, in insertion order.
    pub fn outgoing(&self, id: VertexId) -> impl Iterator<Item = &Edge> + '_ {
        self.vertex(id)
            .into_iter()
            .flat_map(|v| v.outgoing.iter())
            .filter_map(|e| self.edge(*e))
    }

    /// Edges entering `id`, in insertion order.
    pub fn incoming(&self, id: VertexId) -> impl Iterator<Item = &Edge> + '_ {
        self.vertex(id)
            .into_iter()
            .flat_map(|v| v.incoming.iter())
            .filter_map(|e| self.edge(*e))
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter().filter_map(|v| v.as_deref())
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter_map(|e| e.as_deref())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &TripPattern> + '_ {
        self.patterns.iter().filter_map(|p| p.as_deref())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Upper bound on vertex ids, for sizing per-vertex tables.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }
}
