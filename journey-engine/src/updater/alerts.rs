//! Graph-writer tasks that attach and detach service alerts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Alert;
use crate::graph::{EdgeId, EdgeKind, Graph, GraphEditor, VertexKind};

use super::error::UpdaterError;
use super::writer::GraphWriterTask;

/// Where an alert applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertTarget {
    /// A single edge.
    Edge { edge: u32 },
    /// Boarding and alighting at every stop vertex with this stop id.
    Stop { stop_id: String },
}

/// An alert and the places it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPatch {
    pub alert: Alert,
    pub targets: Vec<AlertTarget>,
}

impl AlertTarget {
    /// Edges of `graph` this target covers. Unknown targets cover nothing.
    fn edges(&self, graph: &Graph) -> Vec<EdgeId> {
        match self {
            AlertTarget::Edge { edge } => graph
                .edge(EdgeId(*edge))
                .map(|e| vec![e.id])
                .unwrap_or_default(),
            AlertTarget::Stop { stop_id } => graph
                .vertices()
                .filter(|v| matches!(&v.kind, VertexKind::TransitStop { stop_id: id, .. } if **id == **stop_id))
                .flat_map(|stop| graph.outgoing(stop.id).chain(graph.incoming(stop.id)))
                .filter(|e| matches!(e.kind, EdgeKind::Board(_) | EdgeKind::Alight(_)))
                .map(|e| e.id)
                .collect(),
        }
    }
}

/// Attach alerts to the edges they target.
///
/// Attaching is idempotent, so replaying a feed is harmless. With
/// [`replacing_feed`](Self::replacing_feed) every alert of that feed is
/// detached first, so alerts missing from the new feed disappear in the
/// same edit.
#[derive(Debug, Clone)]
pub struct AlertPatchTask {
    patches: Vec<AlertPatch>,
    replace_feed: Option<String>,
}

impl AlertPatchTask {
    pub fn new(patches: Vec<AlertPatch>) -> Self {
        Self {
            patches,
            replace_feed: None,
        }
    }

    /// Replace the complete alert set of `feed_id` with `patches`.
    pub fn replacing_feed(feed_id: &str, patches: Vec<AlertPatch>) -> Self {
        Self {
            patches,
            replace_feed: Some(feed_id.to_string()),
        }
    }
}

impl GraphWriterTask for AlertPatchTask {
    fn name(&self) -> &str {
        "alert-patch"
    }

    fn run(&self, editor: &mut GraphEditor) -> Result<(), UpdaterError> {
        let removed = match &self.replace_feed {
            Some(feed) => editor.detach_alerts(|a| a.feed_id == *feed),
            None => 0,
        };

        let mut attached = 0;
        let mut unmatched = 0;
        for patch in &self.patches {
            for target in &patch.targets {
                let edges = target.edges(editor.graph());
                if edges.is_empty() {
                    unmatched += 1;
                }
                for edge in edges {
                    if editor.attach_alert(edge, &patch.alert)? {
                        attached += 1;
                    }
                }
            }
        }
        debug!(removed, attached, unmatched, "alert patch applied");
        Ok(())
    }
}

/// Detach alerts of one feed by id.
#[derive(Debug, Clone)]
pub struct RemoveAlertsTask {
    pub feed_id: String,
    pub alert_ids: Vec<String>,
}

impl GraphWriterTask for RemoveAlertsTask {
    fn name(&self) -> &str {
        "remove-alerts"
    }

    fn run(&self, editor: &mut GraphEditor) -> Result<(), UpdaterError> {
        let removed = editor.detach_alerts(|a| a.feed_id == self.feed_id && self.alert_ids.contains(&a.id));
        debug!(removed, feed = %self.feed_id, "alerts removed");
        Ok(())
    }
}
