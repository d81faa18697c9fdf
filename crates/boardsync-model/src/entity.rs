use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntityId, FieldMap, FieldName, FieldValue};

/// Create payload handed to an entity store; the store assigns the id and
/// creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntity {
    pub kind: String,
    pub external_id: Option<String>,
    pub fields: FieldMap,
}

/// A persisted internal entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: String,
    /// Link to the external record this entity was imported from, if any.
    pub external_id: Option<String>,
    pub fields: FieldMap,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Entity {
    pub fn field(&self, name: &FieldName) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
