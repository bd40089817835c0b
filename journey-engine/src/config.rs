//! Engine configuration.

use std::time::Duration;

/// Tunables for planning and for the live updaters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Wall-clock budget for one plan, all rounds included (milliseconds).
    pub search_timeout_ms: u64,

    /// Number of itineraries to look for.
    pub num_itineraries: usize,

    /// Vertices a reverse-search heuristic settles per unit of work.
    pub heuristic_work_batch: usize,

    /// Dequeues between two units of heuristic work.
    pub heuristic_work_interval: usize,

    /// How often to poll the alert feed (seconds).
    pub alert_poll_secs: u64,

    /// Pending graph-writer tasks before `submit` waits for room.
    pub writer_queue_depth: usize,
}

impl EngineConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        search_timeout_ms: u64,
        num_itineraries: usize,
        heuristic_work_batch: usize,
        heuristic_work_interval: usize,
        alert_poll_secs: u64,
        writer_queue_depth: usize,
    ) -> Self {
        Self {
            search_timeout_ms,
            num_itineraries,
            heuristic_work_batch,
            heuristic_work_interval,
            alert_poll_secs,
            writer_queue_depth,
        }
    }

    /// Returns the search timeout as a Duration.
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    /// Returns the alert poll interval as a Duration.
    pub fn alert_poll_interval(&self) -> Duration {
        Duration::from_secs(self.alert_poll_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_timeout_ms: 5_000,
            num_itineraries: 3,
            heuristic_work_batch: 256,
            heuristic_work_interval: 64,
            alert_poll_secs: 60,
            writer_queue_depth: 64,
        }
    }
}
