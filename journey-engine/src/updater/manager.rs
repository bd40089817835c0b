//! Owns the graph writer and the updaters feeding it.

use futures::Stream;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::EngineConfig;
use crate::graph::SharedGraph;

use super::error::UpdaterError;
use super::polling::{FeedSource, PollingUpdater};
use super::streaming::{FeedMessage, StreamingUpdater};
use super::writer::GraphWriter;

/// The live-update side of an engine.
///
/// Starts one graph writer for a network and keeps track of every updater
/// submitting to it, so they can be stopped together.
pub struct UpdaterManager {
    graph: SharedGraph,
    config: EngineConfig,
    writer: GraphWriter,
    writer_task: JoinHandle<()>,
    updaters: Vec<(String, JoinHandle<()>)>,
}

impl UpdaterManager {
    /// Start the graph writer for `graph`.
    pub fn start(graph: SharedGraph, config: &EngineConfig) -> Self {
        let (writer, writer_task) = GraphWriter::spawn(graph.clone(), config.writer_queue_depth);
        Self {
            graph,
            config: config.clone(),
            writer,
            writer_task,
            updaters: Vec::new(),
        }
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    /// Handle for submitting tasks directly.
    pub fn writer(&self) -> &GraphWriter {
        &self.writer
    }

    /// Poll `source` at the configured alert interval.
    pub fn add_polling<S: FeedSource>(&mut self, name: &str, source: S) {
        let updater = PollingUpdater::new(source, self.writer.clone(), self.config.alert_poll_interval());
        let handle = tokio::spawn(updater.run());
        info!(updater = name, "polling updater registered");
        self.updaters.push((name.to_string(), handle));
    }

    /// Drain `stream` into the network in the background.
    pub fn add_streaming<St>(&mut self, name: &str, feed_id: &str, stream: St)
    where
        St: Stream<Item = Result<FeedMessage, UpdaterError>> + Send + Unpin + 'static,
    {
        let updater = StreamingUpdater::new(feed_id, stream, self.writer.clone());
        let handle = tokio::spawn(async move {
            updater.run().await;
        });
        info!(updater = name, "streaming updater registered");
        self.updaters.push((name.to_string(), handle));
    }

    /// Names of the registered updaters still running.
    pub fn running(&self) -> Vec<&str> {
        self.updaters
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Stop every updater, then the writer once its queue has drained.
    pub async fn shutdown(self) -> Result<(), UpdaterError> {
        for (name, handle) in &self.updaters {
            handle.abort();
            info!(updater = %name, "updater stopped");
        }
        self.writer.shutdown().await?;
        self.writer_task
            .await
            .map_err(|e| UpdaterError::Task(e.to_string()))
    }
}
