//! Service alerts attached to network edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an alert does to the edges it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertEffect {
    /// Shown to travellers, does not change routing.
    Informational,
    /// The edge cannot be used while the alert is active.
    NoService,
}

/// A real-time service alert.
///
/// Alerts are identified by `(feed_id, id)`. Attaching the same alert to an
/// edge twice leaves the edge unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub feed_id: String,
    pub id: String,
    pub header: String,
    pub effect: AlertEffect,
    /// Start of the active window; `None` means active since forever.
    #[serde(default)]
    pub active_from: Option<DateTime<Utc>>,
    /// End of the active window (exclusive); `None` means open-ended.
    #[serde(default)]
    pub active_until: Option<DateTime<Utc>>,
}

impl Alert {
    /// Returns true if the alert is active at the given epoch second.
    pub fn is_active_at(&self, epoch_secs: i64) -> bool {
        let after_start = self
            .active_from
            .is_none_or(|from| from.timestamp() <= epoch_secs);
        let before_end = self
            .active_until
            .is_none_or(|until| epoch_secs < until.timestamp());
        after_start && before_end
    }

    /// Returns true if this alert blocks travel at the given epoch second.
    pub fn blocks_at(&self, epoch_secs: i64) -> bool {
        self.effect == AlertEffect::NoService && self.is_active_at(epoch_secs)
    }

    /// Returns true if `other` has the same identity.
    pub fn same_identity(&self, other: &Alert) -> bool {
        self.feed_id == other.feed_id && self.id == other.id
    }
}
