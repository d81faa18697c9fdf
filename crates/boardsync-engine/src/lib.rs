//! Import engine: candidate building, duplicate detection, batch commit,
//! the interactive session, and sync-back.
//!
//! The engine is synchronous and talks to persistence only through the
//! store and source traits. Per-record problems are data in its results;
//! `Err` is reserved for faults that stop a whole call.

#![deny(unsafe_code)]

pub mod candidate;
pub mod dedupe;
pub mod error;
pub mod import;
pub mod session;
pub mod syncback;

pub use candidate::{apply_overrides, build_candidate, missing_required};
pub use dedupe::{CompositeKey, DuplicateRule, find_duplicate};
pub use error::{EngineError, SessionError, SyncBackError};
pub use import::{ImportProfile, Importer};
pub use session::{ImportSession, SessionState};
pub use syncback::sync_back;
