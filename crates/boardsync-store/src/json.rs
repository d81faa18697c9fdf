//! Single-file JSON persistence used by the CLI.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use boardsync_model::{ColumnWrite, Entity, EntityId, ExternalRecord, NewEntity};

use crate::error::{SourceError, StoreError};
use crate::traits::{EntityStore, RecordSource, allocate_id, apply_writes};

/// On-disk shape of an entity store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entities: Vec<Entity>,
}

/// On-disk shape of a board export file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BoardFile {
    #[serde(default)]
    records: Vec<ExternalRecord>,
}

/// Entity store persisted as one JSON file, rewritten through a temp
/// file and rename after every mutation.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    entities: RefCell<BTreeMap<EntityId, Entity>>,
    next_seq: Cell<u64>,
}

impl JsonStore {
    /// Opens a store file. A missing file is an empty store; the file is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut entities = BTreeMap::new();
        if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| StoreError::Io {
                operation: "read",
                path: path.clone(),
                source: e,
            })?;
            let file: StoreFile = serde_json::from_str(&text).map_err(|e| StoreError::Serde {
                path: path.clone(),
                source: e,
            })?;
            for entity in file.entities {
                entities.insert(entity.id.clone(), entity);
            }
        }
        let next_seq = Cell::new(entities.len() as u64 + 1);
        tracing::debug!(
            path = %path.display(),
            entities = entities.len(),
            "opened entity store"
        );
        Ok(Self {
            path,
            entities: RefCell::new(entities),
            next_seq,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let file = StoreFile {
            entities: self.entities.borrow().values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| StoreError::Serde {
            path: self.path.clone(),
            source: e,
        })?;
        write_atomic(&self.path, json.as_bytes()).map_err(|(operation, source)| {
            StoreError::Io {
                operation,
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::debug!(
            path = %self.path.display(),
            entities = file.entities.len(),
            "persisted entity store"
        );
        Ok(())
    }
}

impl EntityStore for JsonStore {
    fn fetch(&self, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        Ok(self.entities.borrow().get(id).cloned())
    }

    fn create(&self, new_entity: NewEntity) -> Result<Entity, StoreError> {
        let entity = {
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
            entity
        };
        self.persist()?;
        Ok(entity)
    }

    fn update(&self, entity: &Entity) -> Result<(), StoreError> {
        {
            let mut entities = self.entities.borrow_mut();
            if !entities.contains_key(&entity.id) {
                return Err(StoreError::NotFound {
                    id: entity.id.clone(),
                });
            }
            entities.insert(entity.id.clone(), entity.clone());
        }
        self.persist()
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

/// Board export persisted as one JSON file. Column writes from sync-back
/// are applied in memory and the whole file is rewritten.
#[derive(Debug)]
pub struct JsonSource {
    path: PathBuf,
    records: RefCell<BTreeMap<String, ExternalRecord>>,
    order: Vec<String>,
}

impl JsonSource {
    /// Opens a board file. Unlike the store, the board must exist: an
    /// absent export is a caller mistake, not an empty board.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|e| SourceError::Io {
            operation: "read",
            path: path.clone(),
            source: e,
        })?;
        let file: BoardFile = serde_json::from_str(&text).map_err(|e| SourceError::Serde {
            path: path.clone(),
            source: e,
        })?;
        let order: Vec<String> = file
            .records
            .iter()
            .map(|record| record.external_id.clone())
            .collect();
        let records = file
            .records
            .into_iter()
            .map(|record| (record.external_id.clone(), record))
            .collect();
        tracing::debug!(
            path = %path.display(),
            records = order.len(),
            "opened board file"
        );
        Ok(Self {
            path,
            records: RefCell::new(records),
            order,
        })
    }

    /// Record ids in board file order, for whole-board operations.
    pub fn record_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    fn persist(&self) -> Result<(), SourceError> {
        let records = self.records.borrow();
        let file = BoardFile {
            records: self
                .order
                .iter()
                .filter_map(|id| records.get(id).cloned())
                .collect(),
        };
        drop(records);
        let json = serde_json::to_string_pretty(&file).map_err(|e| SourceError::Serde {
            path: self.path.clone(),
            source: e,
        })?;
        write_atomic(&self.path, json.as_bytes()).map_err(|(operation, source)| {
            SourceError::Io {
                operation,
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(())
    }
}

impl RecordSource for JsonSource {
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
        {
            let mut records = self.records.borrow_mut();
            let record =
                records
                    .get_mut(external_id)
                    .ok_or_else(|| SourceError::RecordNotFound {
                        external_id: external_id.to_string(),
                    })?;
            apply_writes(record, writes);
        }
        self.persist()?;
        tracing::debug!(external_id, writes = writes.len(), "updated board record");
        Ok(())
    }
}

/// Writes to a temp file next to the target, then renames over it. The
/// error carries the step that failed.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), (&'static str, std::io::Error)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ("create directory for", e))?;
    }
    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| ("create temp file for", e))?;
    file.write_all(bytes).map_err(|e| ("write", e))?;
    file.sync_all().map_err(|e| ("sync", e))?;
    fs::rename(&temp_path, path).map_err(|e| ("replace", e))?;
    Ok(())
}
