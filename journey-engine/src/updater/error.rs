//! Updater error types.

use std::fmt;

use crate::graph::GraphError;

/// Errors from feed fetching and graph-writer tasks.
#[derive(Debug)]
pub enum UpdaterError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Feed payload could not be decoded
    Decode {
        message: String,
        body: Option<String>,
    },

    /// Feed endpoint returned an error status code
    Feed { status: u16, message: String },

    /// A graph edit was rejected
    Graph(GraphError),

    /// A task failed for another reason
    Task(String),

    /// The graph writer is no longer running
    WriterClosed,
}

impl fmt::Display for UpdaterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdaterError::Http(e) => write!(f, "HTTP error: {e}"),
            UpdaterError::Decode { message, body } => {
                write!(f, "feed decode error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            UpdaterError::Feed { status, message } => {
                write!(f, "feed error {status}: {message}")
            }
            UpdaterError::Graph(e) => write!(f, "graph edit rejected: {e}"),
            UpdaterError::Task(msg) => write!(f, "task failed: {msg}"),
            UpdaterError::WriterClosed => write!(f, "graph writer is shut down"),
        }
    }
}

impl std::error::Error for UpdaterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpdaterError::Http(e) => Some(e),
            UpdaterError::Graph(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpdaterError {
    fn from(err: reqwest::Error) -> Self {
        UpdaterError::Http(err)
    }
}

impl From<GraphError> for UpdaterError {
    fn from(err: GraphError) -> Self {
        UpdaterError::Graph(err)
    }
}
