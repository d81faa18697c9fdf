//! Reverse mapping: entity fields back to external column writes.

use boardsync_model::{ColumnWrite, Entity};

use crate::rules::MappingRules;
use crate::transform::TransformerRegistry;

/// Plans the writes that push an entity's fields back to its external
/// record.
///
/// The forward resolver accepts any listed title; the reverse direction
/// must be deterministic, so each field always uses the FIRST title in its
/// rule. Fields without a title rule cannot be addressed on the external
/// side and are skipped, as are absent or empty values. Output follows
/// title-rule declaration order.
pub fn plan_writes(
    rules: &MappingRules,
    registry: &TransformerRegistry,
    entity: &Entity,
) -> Vec<ColumnWrite> {
    let mut writes = Vec::new();
    for rule in &rules.titles {
        let Some(value) = entity.field(&rule.field) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let Some(title) = rule.any_of.first() else {
            continue;
        };
        writes.push(ColumnWrite {
            title: title.clone(),
            value: registry.reverse(&rule.field, value),
        });
    }
    writes
}
