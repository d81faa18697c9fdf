//! Persistence for internal entities and external board records.
//!
//! The import engine talks to storage only through the [`EntityStore`]
//! and [`RecordSource`] traits. [`MemoryStore`] and [`MemorySource`] back
//! tests and embedding callers; [`JsonStore`] and [`JsonSource`] back the
//! CLI with single-file JSON persistence.

#![deny(unsafe_code)]

pub mod error;
pub mod json;
pub mod memory;
pub mod traits;

pub use error::{SourceError, StoreError};
pub use json::{JsonSource, JsonStore};
pub use memory::{MemorySource, MemoryStore};
pub use traits::{EntityStore, RecordSource};
