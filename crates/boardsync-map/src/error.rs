//! Error types for mapping operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from rule validation and the rules repository.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid mapping rules: {detail}")]
    InvalidRules { detail: String },

    #[error("no mapping rules stored for kind {kind:?}")]
    NotFound { kind: String },

    #[error("failed to {operation} {}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rules file {}", .path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A per-field conversion failure. Recorded against the candidate's field
/// instead of aborting resolution of the other fields.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("could not parse {detail}")]
    Parse { detail: String },
}

impl TransformError {
    pub fn parse(detail: impl Into<String>) -> Self {
        TransformError::Parse {
            detail: detail.into(),
        }
    }
}
