//! Graph editing errors.

use super::{EdgeId, PatternId, VertexId};

/// Errors raised while editing a graph.
///
/// An error aborts the edit; the published graph is left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown vertex {0:?}")]
    UnknownVertex(VertexId),

    #[error("unknown vertex label {0:?}")]
    UnknownLabel(String),

    #[error("duplicate vertex label {0:?}")]
    DuplicateLabel(String),

    #[error("unknown edge {0:?}")]
    UnknownEdge(EdgeId),

    #[error("unknown pattern {0:?}")]
    UnknownPattern(PatternId),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("invalid edge: {0}")]
    InvalidEdge(&'static str),
}
