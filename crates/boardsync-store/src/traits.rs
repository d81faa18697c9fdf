//! Persistence seams consumed by the import engine.

use std::cell::Cell;
use std::collections::BTreeMap;

use serde_json::Value;

use boardsync_model::{ColumnWrite, Entity, EntityId, ExternalRecord, NewEntity};

use crate::error::{SourceError, StoreError};

/// Store of persisted internal entities.
///
/// Methods take `&self`: the engine is single-caller and interior
/// mutability is an implementation concern.
pub trait EntityStore {
    fn fetch(&self, id: &EntityId) -> Result<Option<Entity>, StoreError>;

    /// Persists a new entity, assigning its id and creation timestamp.
    fn create(&self, new_entity: NewEntity) -> Result<Entity, StoreError>;

    /// Replaces a persisted entity; `NotFound` when the id is unknown.
    fn update(&self, entity: &Entity) -> Result<(), StoreError>;

    fn find_matching(
        &self,
        kind: &str,
        predicate: &dyn Fn(&Entity) -> bool,
    ) -> Result<Vec<Entity>, StoreError>;

    /// Every persisted entity of one kind, in stable id order.
    fn snapshot(&self, kind: &str) -> Result<Vec<Entity>, StoreError> {
        self.find_matching(kind, &|_| true)
    }
}

/// The external tabular system records come from and sync back to.
pub trait RecordSource {
    fn fetch_record(&self, external_id: &str) -> Result<ExternalRecord, SourceError>;

    /// Applies column writes to a record; columns are addressed by title.
    fn update_record(
        &self,
        external_id: &str,
        writes: &[ColumnWrite],
    ) -> Result<(), SourceError>;
}

/// Next free sequential id of the form `ent-000001`.
pub(crate) fn allocate_id(
    taken: &BTreeMap<EntityId, Entity>,
    next_seq: &Cell<u64>,
) -> Result<EntityId, StoreError> {
    loop {
        let seq = next_seq.get();
        next_seq.set(seq + 1);
        let id = EntityId::new(format!("ent-{:06}", seq))?;
        if !taken.contains_key(&id) {
            return Ok(id);
        }
    }
}

/// Applies writes to a record in place. Titles compare case-insensitively;
/// writes whose title matches no column are ignored, which is what the
/// external system does for stale titles.
pub(crate) fn apply_writes(record: &mut ExternalRecord, writes: &[ColumnWrite]) {
    for write in writes {
        let matched = record.columns.iter_mut().find(|column| {
            column
                .title
                .as_deref()
                .is_some_and(|title| title.trim().eq_ignore_ascii_case(write.title.trim()))
        });
        if let Some(column) = matched {
            column.text = Some(write_text(&write.value));
            column.value = Some(write.value.clone());
        }
    }
}

fn write_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
