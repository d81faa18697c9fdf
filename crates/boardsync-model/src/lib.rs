pub mod batch;
pub mod candidate;
pub mod entity;
pub mod error;
pub mod ids;
pub mod record;
pub mod value;

pub use batch::{BatchEntry, BatchError, CommitOutcome, ImportBatchResult};
pub use candidate::{FetchFailure, ImportCandidate, PreviewReport};
pub use entity::{Entity, NewEntity};
pub use error::{ModelError, Result};
pub use ids::{EntityId, FieldName};
pub use record::{Column, ColumnWrite, ExternalRecord};
pub use value::{FieldMap, FieldValue};
