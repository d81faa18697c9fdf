//! Push of entity fields back to the external record.

use chrono::Utc;
use tracing::{debug, info};

use boardsync_map::{MappingRules, TransformerRegistry, plan_writes};
use boardsync_model::{Entity, EntityId};
use boardsync_store::{EntityStore, RecordSource};

use crate::error::SyncBackError;

/// Writes an entity's current field values to its linked external record.
///
/// `last_synced_at` moves only after the external write succeeded; any
/// failure leaves the entity exactly as it was. Returns the updated
/// entity.
pub fn sync_back<S: EntityStore, R: RecordSource>(
    store: &S,
    source: &R,
    rules: &MappingRules,
    registry: &TransformerRegistry,
    entity_id: &EntityId,
) -> Result<Entity, SyncBackError> {
    let mut entity = store
        .fetch(entity_id)?
        .ok_or_else(|| SyncBackError::UnknownEntity {
            id: entity_id.clone(),
        })?;
    let Some(external_id) = entity.external_id.clone() else {
        return Err(SyncBackError::NotLinked {
            id: entity_id.clone(),
        });
    };
    let writes = plan_writes(rules, registry, &entity);
    if writes.is_empty() {
        return Err(SyncBackError::NothingToSync {
            id: entity_id.clone(),
        });
    }
    debug!(
        entity_id = %entity.id,
        external_id = %external_id,
        writes = writes.len(),
        "pushing fields"
    );
    source.update_record(&external_id, &writes)?;
    entity.last_synced_at = Some(Utc::now());
    store.update(&entity)?;
    info!(entity_id = %entity.id, external_id = %external_id, "sync complete");
    Ok(entity)
}
