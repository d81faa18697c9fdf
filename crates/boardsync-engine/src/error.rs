//! Engine error types.
//!
//! Per-candidate problems (validation gaps, duplicates, persist failures)
//! are data in the batch result; only faults that stop a whole call land
//! here.

use thiserror::Error;

use boardsync_model::EntityId;
use boardsync_store::{SourceError, StoreError};

/// Fatal fault in a preview or commit call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Session misuse: an operation called from a state that does not accept
/// it. Data problems flow through the session state instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {operation} while the session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },
}

/// Sync-back failure; the entity's local state is unchanged.
#[derive(Debug, Error)]
pub enum SyncBackError {
    #[error("no entity with id {id}")]
    UnknownEntity { id: EntityId },

    #[error("entity {id} is not linked to an external record")]
    NotLinked { id: EntityId },

    #[error("entity {id} has no field a title rule can address")]
    NothingToSync { id: EntityId },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
