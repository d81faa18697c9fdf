//! Persistence and source error types.

use std::path::PathBuf;

use thiserror::Error;

use boardsync_model::{EntityId, ModelError};

/// Entity store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no entity with id {id}")]
    NotFound { id: EntityId },

    #[error("failed to {operation} {}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store file {}", .path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("entity id error: {0}")]
    Id(#[from] ModelError),
}

/// External record source error. Fatal only for the affected record id.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no external record with id {external_id:?}")]
    RecordNotFound { external_id: String },

    #[error("failed to {operation} {}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid board file {}", .path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("external system error: {message}")]
    Backend { message: String },
}
