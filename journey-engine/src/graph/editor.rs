//! Copy-on-write graph editing.
//!
//! An editor starts from a private clone of a snapshot's arenas. Every
//! change replaces the touched `Arc` entries with new ones, so vertices and
//! edges reachable from the published snapshot are never written to.
//! [`GraphEditor::finish`] yields the next snapshot.

use std::sync::Arc;

use crate::domain::{Alert, Coordinate, TraverseMode, TraverseModeSet};

use super::edge::{
    AlightEdge, BoardEdge, DwellEdge, Edge, EdgeId, EdgeKind, HopEdge, StreetEdge,
};
use super::error::GraphError;
use super::network::Graph;
use super::pattern::{PatternId, TripPattern, TripTimes};
use super::vertex::{Vertex, VertexId, VertexKind};

/// Staged changes to a graph.
#[derive(Debug, Default)]
pub struct GraphEditor {
    graph: Graph,
}

impl GraphEditor {
    /// Start editing an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing a copy of `base`. `base` itself is never modified.
    pub fn from_graph(base: &Graph) -> Self {
        Self {
            graph: base.clone(),
        }
    }

    /// Read access to the staged graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Publish the staged graph as the next generation.
    pub fn finish(mut self) -> Graph {
        self.graph.generation += 1;
        self.graph
    }

    fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex, GraphError> {
        self.graph
            .vertices
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
            .map(Arc::make_mut)
            .ok_or(GraphError::UnknownVertex(id))
    }

    fn require_vertex(&self, id: VertexId) -> Result<&Vertex, GraphError> {
        self.graph.vertex(id).ok_or(GraphError::UnknownVertex(id))
    }

    /// Add a vertex with a unique label.
    pub fn add_vertex(
        &mut self,
        label: &str,
        coordinate: Coordinate,
        kind: VertexKind,
    ) -> Result<VertexId, GraphError> {
        if self.graph.labels.contains_key(label) {
            return Err(GraphError::DuplicateLabel(label.to_string()));
        }
        let id = VertexId(self.graph.vertices.len() as u32);
        let vertex = Vertex::new(id, label, coordinate, kind);
        self.graph.labels.insert(vertex.label.clone(), id);
        self.graph.vertices.push(Some(Arc::new(vertex)));
        Ok(id)
    }

    /// Add an edge and register it on both endpoints.
    pub fn add_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        kind: EdgeKind,
    ) -> Result<EdgeId, GraphError> {
        self.require_vertex(from)?;
        self.require_vertex(to)?;
        if let EdgeKind::Street(street) = &kind {
            if !street.length_m.is_finite() || street.length_m < 0.0 {
                return Err(GraphError::InvalidEdge("street length must be finite and non-negative"));
            }
        }
        if let Some(pattern) = edge_pattern(&kind) {
            self.graph
                .pattern(pattern)
                .ok_or(GraphError::UnknownPattern(pattern))?;
        }

        let id = EdgeId(self.graph.edges.len() as u32);
        self.graph
            .edges
            .push(Some(Arc::new(Edge::new(id, from, to, kind))));
        self.vertex_mut(from)?.outgoing.push(id);
        self.vertex_mut(to)?.incoming.push(id);
        Ok(id)
    }

    /// Add a straight street segment, deriving length and bearing from the
    /// endpoint coordinates.
    pub fn add_street(
        &mut self,
        from: VertexId,
        to: VertexId,
        name: &str,
        permission: TraverseModeSet,
    ) -> Result<EdgeId, GraphError> {
        let a = self.require_vertex(from)?.coordinate;
        let b = self.require_vertex(to)?.coordinate;
        let mut street = StreetEdge::new(name, a.distance_to(&b), a.bearing_to(&b));
        street.permission = permission;
        self.add_edge(from, to, EdgeKind::Street(street))
    }

    /// Add a street segment in both directions.
    pub fn add_street_pair(
        &mut self,
        a: VertexId,
        b: VertexId,
        name: &str,
        permission: TraverseModeSet,
    ) -> Result<(EdgeId, EdgeId), GraphError> {
        let forward = self.add_street(a, b, name, permission)?;
        let back = self.add_street(b, a, name, permission)?;
        Ok((forward, back))
    }

    /// Add a trip pattern serving `stops` and its on-board structure.
    ///
    /// For every stop a depart and an arrive vertex are created, joined by
    /// board, hop, dwell and alight edges.
    pub fn add_pattern(
        &mut self,
        route_id: &str,
        mode: TraverseMode,
        stops: Vec<VertexId>,
        trips: Vec<TripTimes>,
    ) -> Result<PatternId, GraphError> {
        for stop in &stops {
            match self.require_vertex(*stop)?.kind {
                VertexKind::TransitStop { .. } => {}
                _ => return Err(GraphError::InvalidPattern(format!("{stop:?} is not a stop"))),
            }
        }
        let id = PatternId(self.graph.patterns.len() as u32);
        let pattern = TripPattern::new(id, route_id, mode, stops.clone(), trips)?;
        self.graph.patterns.push(Some(Arc::new(pattern)));

        let last = stops.len() - 1;
        let mut departs = Vec::with_capacity(stops.len());
        let mut arrives = Vec::with_capacity(stops.len());
        for (stop_index, stop) in stops.iter().enumerate() {
            let coordinate = self.require_vertex(*stop)?.coordinate;
            let depart = self.add_vertex(
                &format!("{id:?}:depart:{stop_index}"),
                coordinate,
                VertexKind::PatternDepart {
                    pattern: id,
                    stop_index,
                },
            )?;
            let arrive = self.add_vertex(
                &format!("{id:?}:arrive:{stop_index}"),
                coordinate,
                VertexKind::PatternArrive {
                    pattern: id,
                    stop_index,
                },
            )?;
            departs.push(depart);
            arrives.push(arrive);
        }

        for (stop_index, stop) in stops.iter().enumerate() {
            if stop_index < last {
                self.add_edge(
                    *stop,
                    departs[stop_index],
                    EdgeKind::Board(BoardEdge {
                        pattern: id,
                        stop_index,
                    }),
                )?;
                self.add_edge(
                    departs[stop_index],
                    arrives[stop_index + 1],
                    EdgeKind::Hop(HopEdge {
                        pattern: id,
                        stop_index,
                    }),
                )?;
            }
            if stop_index > 0 {
                self.add_edge(
                    arrives[stop_index],
                    *stop,
                    EdgeKind::Alight(AlightEdge {
                        pattern: id,
                        stop_index,
                    }),
                )?;
            }
            if stop_index > 0 && stop_index < last {
                self.add_edge(
                    arrives[stop_index],
                    departs[stop_index],
                    EdgeKind::Dwell(DwellEdge {
                        pattern: id,
                        stop_index,
                    }),
                )?;
            }
        }
        Ok(id)
    }

    /// Detach and remove an edge, keeping both endpoint lists consistent.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Arc<Edge>, GraphError> {
        let edge = self
            .graph
            .edges
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(GraphError::UnknownEdge(id))?;
        if let Ok(from) = self.vertex_mut(edge.from) {
            from.outgoing.retain(|e| *e != id);
        }
        if let Ok(to) = self.vertex_mut(edge.to) {
            to.incoming.retain(|e| *e != id);
        }
        Ok(edge)
    }

    /// Remove a vertex and every edge touching it.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<(), GraphError> {
        let vertex = self.require_vertex(id)?;
        let incident: Vec<EdgeId> = vertex
            .outgoing
            .iter()
            .chain(vertex.incoming.iter())
            .copied()
            .collect();
        for edge in incident {
            // Self-loops appear in both lists.
            if self.graph.edge(edge).is_some() {
                self.remove_edge(edge)?;
            }
        }
        if let Some(vertex) = self.graph.vertices[id.index()].take() {
            self.graph.labels.remove(&vertex.label);
        }
        Ok(())
    }

    /// Attach an alert to an edge.
    ///
    /// Returns `false` without changing anything if an alert with the same
    /// identity is already attached.
    pub fn attach_alert(&mut self, id: EdgeId, alert: &Alert) -> Result<bool, GraphError> {
        let edge = self.graph.edge(id).ok_or(GraphError::UnknownEdge(id))?;
        if edge.alerts.iter().any(|a| a.same_identity(alert)) {
            return Ok(false);
        }
        let mut alerts = edge.alerts.to_vec();
        alerts.push(alert.clone());
        self.replace_alerts(id, alerts);
        Ok(true)
    }

    /// Detach every alert matching `predicate` from every edge.
    ///
    /// Returns the number of alerts removed.
    pub fn detach_alerts<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Alert) -> bool,
    {
        let affected: Vec<(EdgeId, Vec<Alert>)> = self
            .graph
            .edges()
            .filter(|e| e.alerts.iter().any(&predicate))
            .map(|e| {
                let kept = e.alerts.iter().filter(|a| !predicate(*a)).cloned().collect();
                (e.id, kept)
            })
            .collect();
        let mut removed = 0;
        for (id, kept) in affected {
            if let Some(edge) = self.graph.edge(id) {
                removed += edge.alerts.len() - kept.len();
            }
            self.replace_alerts(id, kept);
        }
        removed
    }

    fn replace_alerts(&mut self, id: EdgeId, alerts: Vec<Alert>) {
        if let Some(slot) = self.graph.edges.get_mut(id.index()).and_then(|s| s.as_mut()) {
            Arc::make_mut(slot).alerts = Arc::from(alerts);
        }
    }
}

fn edge_pattern(kind: &EdgeKind) -> Option<PatternId> {
    match kind {
        EdgeKind::Board(e) => Some(e.pattern),
        EdgeKind::Alight(e) => Some(e.pattern),
        EdgeKind::Hop(e) => Some(e.pattern),
        EdgeKind::Dwell(e) => Some(e.pattern),
        _ => None,
    }
}
