//! Live network updates.
//!
//! Every change to a running network is a [`GraphWriterTask`] applied by the
//! single [`GraphWriter`]. Feeds reach the writer through a
//! [`PollingUpdater`] (periodic fetch of a [`FeedSource`]) or a
//! [`StreamingUpdater`] (pushed messages), usually owned by an
//! [`UpdaterManager`].

mod alerts;
mod error;
mod http;
mod manager;
mod polling;
mod streaming;
mod writer;

pub use alerts::{AlertPatch, AlertPatchTask, AlertTarget, RemoveAlertsTask};
pub use error::UpdaterError;
pub use http::{AlertEntry, AlertFeedDocument, HttpFeedConfig, HttpFeedSource, parse_feed};
pub use manager::UpdaterManager;
pub use polling::{FeedSnapshot, FeedSource, PollingUpdater};
pub use streaming::{FeedMessage, StreamingUpdater};
pub use writer::{GraphWriter, GraphWriterTask};
