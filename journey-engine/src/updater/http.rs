//! JSON alert feed over HTTP.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Alert, AlertEffect};

use super::alerts::{AlertPatch, AlertTarget};
use super::error::UpdaterError;
use super::polling::{FeedSnapshot, FeedSource};

/// Configuration for an HTTP alert feed.
#[derive(Debug, Clone)]
pub struct HttpFeedConfig {
    /// Identifies the feed's alerts in the network
    pub feed_id: String,
    /// Endpoint returning the full alert document
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpFeedConfig {
    pub fn new(feed_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            feed_id: feed_id.into(),
            url: url.into(),
            timeout_secs: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Alert document as served by the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFeedDocument {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub alerts: Vec<AlertEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntry {
    pub id: String,
    #[serde(default)]
    pub header: String,
    pub effect: AlertEffect,
    #[serde(default)]
    pub active_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub targets: Vec<AlertTarget>,
}

impl AlertFeedDocument {
    /// Convert into a snapshot tagged with `feed_id`.
    pub fn into_snapshot(self, feed_id: &str) -> FeedSnapshot {
        let patches = self
            .alerts
            .into_iter()
            .map(|entry| AlertPatch {
                alert: Alert {
                    feed_id: feed_id.to_string(),
                    id: entry.id,
                    header: entry.header,
                    effect: entry.effect,
                    active_from: entry.active_from,
                    active_until: entry.active_until,
                },
                targets: entry.targets,
            })
            .collect();
        FeedSnapshot {
            feed_id: feed_id.to_string(),
            timestamp: self.generated_at,
            patches,
        }
    }
}

/// Parse a feed body.
pub fn parse_feed(body: &str, feed_id: &str) -> Result<FeedSnapshot, UpdaterError> {
    let document: AlertFeedDocument =
        serde_json::from_str(body).map_err(|e| UpdaterError::Decode {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;
    Ok(document.into_snapshot(feed_id))
}

/// Fetches the full alert document with a GET per poll.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    http: reqwest::Client,
    feed_id: String,
    url: String,
}

impl HttpFeedSource {
    pub fn new(config: HttpFeedConfig) -> Result<Self, UpdaterError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            feed_id: config.feed_id,
            url: config.url,
        })
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<FeedSnapshot, UpdaterError> {
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpdaterError::Feed {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_feed(&body, &self.feed_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "generatedAt": "2024-03-15T08:30:00Z",
        "alerts": [
            {
                "id": "closure-17",
                "header": "Station closed",
                "effect": "NO_SERVICE",
                "activeUntil": "2024-03-15T12:00:00Z",
                "targets": [
                    {"type": "stop", "stop_id": "M"},
                    {"type": "edge", "edge": 12}
                ]
            },
            {
                "id": "info-3",
                "effect": "INFORMATIONAL"
            }
        ]
    }"#;

    #[test]
    fn parses_feed_document() {
        let snapshot = parse_feed(SAMPLE, "tfl").unwrap();

        assert_eq!(snapshot.feed_id, "tfl");
        assert_eq!(snapshot.timestamp.to_rfc3339(), "2024-03-15T08:30:00+00:00");
        assert_eq!(snapshot.patches.len(), 2);

        let closure = &snapshot.patches[0];
        assert_eq!(closure.alert.feed_id, "tfl");
        assert_eq!(closure.alert.effect, AlertEffect::NoService);
        assert!(closure.alert.active_from.is_none());
        assert!(closure.alert.active_until.is_some());
        assert_eq!(closure.targets.len(), 2);

        let info = &snapshot.patches[1];
        assert_eq!(info.alert.header, "");
        assert!(info.targets.is_empty());
    }

    #[test]
    fn decode_error_keeps_body_excerpt() {
        let err = parse_feed("{\"alerts\": []}", "tfl").unwrap_err();
        match err {
            UpdaterError::Decode { message, body } => {
                assert!(message.contains("generatedAt"));
                assert_eq!(body.as_deref(), Some("{\"alerts\": []}"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_effect_rejected() {
        let body = r#"{"generatedAt": "2024-03-15T08:30:00Z", "alerts": [{"id": "x", "effect": "DETOUR"}]}"#;
        assert!(matches!(
            parse_feed(body, "tfl"),
            Err(UpdaterError::Decode { .. })
        ));
    }
}
