//! Periodic feed polling.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::alerts::{AlertPatch, AlertPatchTask};
use super::error::UpdaterError;
use super::writer::GraphWriter;

/// The complete alert set of one feed at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub feed_id: String,
    /// When the feed producer generated this snapshot.
    pub timestamp: DateTime<Utc>,
    pub patches: Vec<AlertPatch>,
}

/// Something that can be asked for the current state of a feed.
pub trait FeedSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<FeedSnapshot, UpdaterError>> + Send;
}

/// Fetches a feed on a fixed interval and hands newer snapshots to the
/// graph writer.
pub struct PollingUpdater<S> {
    source: S,
    writer: GraphWriter,
    interval: Duration,
    last_seen: Option<DateTime<Utc>>,
}

impl<S: FeedSource> PollingUpdater<S> {
    pub fn new(source: S, writer: GraphWriter, interval: Duration) -> Self {
        Self {
            source,
            writer,
            interval,
            last_seen: None,
        }
    }

    /// Timestamp of the last snapshot handed to the writer.
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Run one fetch cycle.
    ///
    /// Returns `true` if a task was submitted, `false` if the snapshot was
    /// not newer than the last one seen.
    pub async fn poll_once(&mut self) -> Result<bool, UpdaterError> {
        let snapshot = self.source.fetch().await?;
        if self.last_seen.is_some_and(|seen| snapshot.timestamp <= seen) {
            debug!(feed = %snapshot.feed_id, timestamp = %snapshot.timestamp, "feed unchanged");
            return Ok(false);
        }

        let timestamp = snapshot.timestamp;
        let alerts = snapshot.patches.len();
        self.writer
            .submit(AlertPatchTask::replacing_feed(&snapshot.feed_id, snapshot.patches))
            .await?;
        self.last_seen = Some(timestamp);
        debug!(feed = %snapshot.feed_id, %timestamp, alerts, "feed snapshot submitted");
        Ok(true)
    }

    /// Poll until the writer shuts down.
    ///
    /// Fetch and decode failures are logged and the next cycle runs as
    /// normal.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = self.interval.as_millis() as u64, "polling updater started");
        loop {
            ticker.tick().await;
            if self.writer.is_closed() {
                break;
            }
            match self.poll_once().await {
                Ok(_) => {}
                Err(UpdaterError::WriterClosed) => break,
                Err(err) => warn!(%err, "feed poll failed"),
            }
        }
        info!("polling updater stopped");
    }
}
