//! In-memory store and source, used by tests and library callers that
//! manage their own persistence.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use chrono::Utc;

use boardsync_model::{ColumnWrite, Entity, EntityId, ExternalRecord, NewEntity};

use crate::error::{SourceError, StoreError};
use crate::traits::{EntityStore, RecordSource, allocate_id, apply_writes};

/// Entity store backed by a `BTreeMap`, ids assigned sequentially.
#[derive(Debug)]
pub struct MemoryStore {
    entities: RefCell<BTreeMap<EntityId, Entity>>,
    next_seq: Cell<u64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entities: RefCell::new(BTreeMap::new()),
            next_seq: Cell::new(1),
        }
    }

    /// Seeds the store with already-persisted entities.
    pub fn with_entities(entities: Vec<Entity>) -> Self {
        let store = Self::new();
        store.next_seq.set(entities.len() as u64 + 1);
        let mut map = store.entities.borrow_mut();
        for entity in entities {
            map.insert(entity.id.clone(), entity);
        }
        drop(map);
        store
    }

    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }
}

impl EntityStore for MemoryStore {
    fn fetch(&self, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        Ok(self.entities.borrow().get(id).cloned())
    }

    fn create(&self, new_entity: NewEntity) -> Result<Entity, StoreError> {
        let mut entities = self.entities.borrow_mut();
        let id = allocate_id(&entities, &self.next_seq)?;
        let entity = Entity {
            id: id.clone(),
            kind: new_entity.kind,
            external_id: new_entity.external_id,
            fields: new_entity.fields,
            created_at: Utc::now(),
            last_synced_at: None,
        };
        entities.insert(id, entity.clone());
        Ok(entity)
    }

    fn update(&self, entity: &Entity) -> Result<(), StoreError> {
        let mut entities = self.entities.borrow_mut();
        if !entities.contains_key(&entity.id) {
            return Err(StoreError::NotFound {
                id: entity.id.clone(),
            });
        }
        entities.insert(entity.id.clone(), entity.clone());
        Ok(())
    }

    fn find_matching(
        &self,
        kind: &str,
        predicate: &dyn Fn(&Entity) -> bool,
    ) -> Result<Vec<Entity>, StoreError> {
        Ok(self
            .entities
            .borrow()
            .values()
            .filter(|entity| entity.kind == kind && predicate(entity))
            .cloned()
            .collect())
    }
}

/// Record source backed by seeded records; every update is kept for
/// inspection.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: RefCell<BTreeMap<String, ExternalRecord>>,
    updates: RefCell<Vec<(String, Vec<ColumnWrite>)>>,
}

impl MemorySource {
    pub fn new(records: Vec<ExternalRecord>) -> Self {
        let source = Self::default();
        let mut map = source.records.borrow_mut();
        for record in records {
            map.insert(record.external_id.clone(), record);
        }
        drop(map);
        source
    }

    /// Every `update_record` call so far, in call order.
    pub fn updates(&self) -> Vec<(String, Vec<ColumnWrite>)> {
        self.updates.borrow().clone()
    }

    pub fn record(&self, external_id: &str) -> Option<ExternalRecord> {
        self.records.borrow().get(external_id).cloned()
    }
}

impl RecordSource for MemorySource {
    fn fetch_record(&self, external_id: &str) -> Result<ExternalRecord, SourceError> {
        self.records
            .borrow()
            .get(external_id)
            .cloned()
            .ok_or_else(|| SourceError::RecordNotFound {
                external_id: external_id.to_string(),
            })
    }

    fn update_record(
        &self,
        external_id: &str,
        writes: &[ColumnWrite],
    ) -> Result<(), SourceError> {
        let mut records = self.records.borrow_mut();
        let record = records
            .get_mut(external_id)
            .ok_or_else(|| SourceError::RecordNotFound {
                external_id: external_id.to_string(),
            })?;
        apply_writes(record, writes);
        self.updates
            .borrow_mut()
            .push((external_id.to_string(), writes.to_vec()));
        Ok(())
    }
}
