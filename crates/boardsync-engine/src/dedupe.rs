//! Duplicate detection between a draft and known entities.

use boardsync_map::MappingRules;
use boardsync_model::{Entity, FieldMap, FieldName};

/// Decides whether a draft would duplicate an existing entity.
///
/// What identity means is the entity kind's business: near-match or
/// fuzzy rules plug in here. The engine only runs the scan.
pub trait DuplicateRule {
    fn is_duplicate(&self, draft: &FieldMap, existing: &Entity) -> bool;
}

impl<F> DuplicateRule for F
where
    F: Fn(&FieldMap, &Entity) -> bool,
{
    fn is_duplicate(&self, draft: &FieldMap, existing: &Entity) -> bool {
        self(draft, existing)
    }
}

/// Field-equality rule: a draft duplicates an entity when every key field
/// is present in the draft and equal to the entity's stored value.
///
/// An empty key matches nothing, so a rule set without `duplicate_key`
/// disables detection instead of flagging everything.
#[derive(Debug, Clone, Default)]
pub struct CompositeKey {
    fields: Vec<FieldName>,
}

impl CompositeKey {
    pub fn new(fields: Vec<FieldName>) -> Self {
        Self { fields }
    }

    pub fn from_rules(rules: &MappingRules) -> Self {
        Self::new(rules.duplicate_key.clone())
    }
}

impl DuplicateRule for CompositeKey {
    fn is_duplicate(&self, draft: &FieldMap, existing: &Entity) -> bool {
        if self.fields.is_empty() {
            return false;
        }
        self.fields
            .iter()
            .all(|key| match (draft.get(key), existing.field(key)) {
                (Some(drafted), Some(stored)) => drafted == stored,
                _ => false,
            })
    }
}

/// First entity the rule flags, scanning `known` in its current order.
pub fn find_duplicate<'a>(
    draft: &FieldMap,
    known: &'a [Entity],
    rule: &dyn DuplicateRule,
) -> Option<&'a Entity> {
    known
        .iter()
        .find(|existing| rule.is_duplicate(draft, existing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsync_model::{EntityId, FieldValue};
    use chrono::Utc;

    fn field(name: &str) -> FieldName {
        FieldName::new(name).expect("field name")
    }

    fn visit(id: &str, date: &str, school: &str) -> Entity {
        let mut fields = FieldMap::new();
        fields.insert(field("date"), FieldValue::Text(date.to_string()));
        fields.insert(field("school"), FieldValue::Text(school.to_string()));
        Entity {
            id: EntityId::new(id).expect("entity id"),
            kind: "visit".to_string(),
            external_id: None,
            fields,
            created_at: Utc::now(),
            last_synced_at: None,
        }
    }

    fn draft(date: &str, school: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(field("date"), FieldValue::Text(date.to_string()));
        fields.insert(field("school"), FieldValue::Text(school.to_string()));
        fields
    }

    #[test]
    fn composite_key_needs_every_field_equal() {
        let rule = CompositeKey::new(vec![field("date"), field("school")]);
        let existing = visit("existing1", "2026-03-14", "PS19");

        assert!(rule.is_duplicate(&draft("2026-03-14", "PS19"), &existing));
        assert!(!rule.is_duplicate(&draft("2026-03-14", "PS20"), &existing));
        assert!(!rule.is_duplicate(&draft("2026-03-15", "PS19"), &existing));
    }

    #[test]
    fn missing_key_field_never_matches() {
        let rule = CompositeKey::new(vec![field("date"), field("school")]);
        let existing = visit("existing1", "2026-03-14", "PS19");

        let mut partial = FieldMap::new();
        partial.insert(field("date"), FieldValue::Text("2026-03-14".to_string()));
        assert!(!rule.is_duplicate(&partial, &existing));
    }

    #[test]
    fn empty_key_matches_nothing() {
        let rule = CompositeKey::default();
        let existing = visit("existing1", "2026-03-14", "PS19");
        assert!(!rule.is_duplicate(&draft("2026-03-14", "PS19"), &existing));
    }

    #[test]
    fn scan_returns_the_first_match() {
        let rule = CompositeKey::new(vec![field("school")]);
        let known = vec![
            visit("existing1", "2026-03-13", "PS20"),
            visit("existing2", "2026-03-14", "PS19"),
            visit("existing3", "2026-03-15", "PS19"),
        ];

        let hit = find_duplicate(&draft("2026-03-14", "PS19"), &known, &rule)
            .expect("duplicate found");
        assert_eq!(hit.id.as_str(), "existing2");
    }

    #[test]
    fn closures_work_as_rules() {
        let school = field("school");
        let rule = move |candidate: &FieldMap, existing: &Entity| {
            candidate.get(&school) == existing.field(&school)
        };
        let known = vec![visit("existing1", "2026-03-14", "PS19")];
        assert!(find_duplicate(&draft("any", "PS19"), &known, &rule).is_some());
        assert!(find_duplicate(&draft("any", "PS20"), &known, &rule).is_none());
    }
}
