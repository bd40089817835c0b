//! Push-based feed consumption.

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::alerts::{AlertPatch, AlertPatchTask, RemoveAlertsTask};
use super::error::UpdaterError;
use super::writer::GraphWriter;

/// An incremental change pushed by a feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// New or updated alerts.
    Upsert(Vec<AlertPatch>),
    /// Alerts of this feed that no longer apply.
    Remove(Vec<String>),
}

/// Drains a stream of feed messages into the graph writer.
///
/// Runs once in the background until the stream ends or the writer shuts
/// down. Stream errors are logged and skipped.
pub struct StreamingUpdater<St> {
    feed_id: String,
    stream: St,
    writer: GraphWriter,
}

impl<St> StreamingUpdater<St>
where
    St: Stream<Item = Result<FeedMessage, UpdaterError>> + Send + Unpin + 'static,
{
    pub fn new(feed_id: impl Into<String>, stream: St, writer: GraphWriter) -> Self {
        Self {
            feed_id: feed_id.into(),
            stream,
            writer,
        }
    }

    /// Start draining in a background task.
    ///
    /// The handle resolves to the number of messages handed to the writer.
    pub fn spawn(self) -> JoinHandle<usize> {
        tokio::spawn(self.run())
    }

    /// Drain the stream on the current task, returning the number of
    /// messages handed to the writer.
    pub async fn run(mut self) -> usize {
        info!(feed = %self.feed_id, "streaming updater started");
        let mut submitted = 0;
        while let Some(item) = self.stream.next().await {
            let message = match item {
                Ok(message) => message,
                Err(err) => {
                    warn!(feed = %self.feed_id, %err, "feed message dropped");
                    continue;
                }
            };
            let result = match message {
                FeedMessage::Upsert(patches) => {
                    debug!(feed = %self.feed_id, alerts = patches.len(), "upsert received");
                    self.writer.submit(AlertPatchTask::new(patches)).await
                }
                FeedMessage::Remove(alert_ids) => {
                    debug!(feed = %self.feed_id, alerts = alert_ids.len(), "removal received");
                    self.writer
                        .submit(RemoveAlertsTask {
                            feed_id: self.feed_id.clone(),
                            alert_ids,
                        })
                        .await
                }
            };
            match result {
                Ok(()) => submitted += 1,
                Err(err) => {
                    warn!(feed = %self.feed_id, %err, "streaming updater stopping");
                    break;
                }
            }
        }
        info!(feed = %self.feed_id, submitted, "streaming updater finished");
        submitted
    }
}
