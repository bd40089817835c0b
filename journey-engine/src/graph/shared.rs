//! The live network shared between searches and the graph writer.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::editor::GraphEditor;
use super::network::Graph;

/// Thread-safe handle to the current network snapshot.
///
/// Readers take a snapshot (`Arc<Graph>`) and keep it for the whole search;
/// they never hold a lock while searching. Writers build the next snapshot
/// off to the side and swap it in, so a reader sees either the old or the
/// new version of any vertex or edge, never a mix. A snapshot pinned by a
/// running search keeps removed entries alive until the search drops it.
#[derive(Clone)]
pub struct SharedGraph {
    current: Arc<RwLock<Arc<Graph>>>,
    /// Serializes writers so edits never race each other.
    write_lock: Arc<Mutex<()>>,
}

impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(graph))),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Graph> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Generation of the current snapshot.
    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }

    /// Apply an edit atomically.
    ///
    /// `edit` works on a private copy of the current snapshot. If it returns
    /// an error nothing is published and the network stays as it was.
    /// Returns the generation of the published snapshot.
    pub fn apply<F, E>(&self, edit: F) -> Result<u64, E>
    where
        F: FnOnce(&mut GraphEditor) -> Result<(), E>,
    {
        let _writer = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let base = self.snapshot();
        let mut editor = GraphEditor::from_graph(&base);
        edit(&mut editor)?;
        let next = Arc::new(editor.finish());
        let generation = next.generation();

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
        Ok(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use crate::graph::{GraphError, VertexKind};

    fn origin() -> Coordinate {
        Coordinate { lat: 45.0, lon: 0.0 }
    }

    #[test]
    fn apply_publishes_new_generation() {
        let shared = SharedGraph::new(Graph::empty());
        let before = shared.snapshot();

        let generation = shared
            .apply(|editor| {
                editor.add_vertex("a", origin(), VertexKind::intersection())?;
                Ok::<_, GraphError>(())
            })
            .unwrap();

        assert_eq!(generation, 1);
        assert_eq!(before.vertex_count(), 0);
        assert_eq!(shared.snapshot().vertex_count(), 1);
    }

    #[test]
    fn failed_edit_publishes_nothing() {
        let shared = SharedGraph::new(Graph::empty());
        let result = shared.apply(|editor| {
            editor.add_vertex("a", origin(), VertexKind::intersection())?;
            editor.add_vertex("a", origin(), VertexKind::intersection())?;
            Ok::<_, GraphError>(())
        });

        assert!(result.is_err());
        assert_eq!(shared.generation(), 0);
        assert_eq!(shared.snapshot().vertex_count(), 0);
    }

    #[test]
    fn pinned_snapshot_outlives_removal() {
        let shared = SharedGraph::new(Graph::empty());
        shared
            .apply(|editor| {
                editor.add_vertex("a", origin(), VertexKind::intersection())?;
                Ok::<_, GraphError>(())
            })
            .unwrap();
        let pinned = shared.snapshot();
        let id = pinned.vertex_by_label("a").unwrap().id;

        shared
            .apply(|editor| editor.remove_vertex(id))
            .unwrap();

        assert!(shared.snapshot().vertex(id).is_none());
        assert_eq!(&*pinned.vertex(id).unwrap().label, "a");
    }
}
