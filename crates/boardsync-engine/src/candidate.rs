//! Candidate building: resolve columns, run transforms, check coverage.

use std::collections::BTreeMap;

use boardsync_map::{MappingRules, Resolver, TransformerRegistry};
use boardsync_model::{ExternalRecord, FieldMap, FieldName, ImportCandidate};

/// Builds a candidate from a fetched record.
///
/// Resolution and transformation are pure: no persisted state is
/// consulted and `duplicate_of` stays `None` for the orchestrator to
/// fill. A transform failure is recorded per field and leaves the field
/// unset; blank columns are simply unset, not errors.
pub fn build_candidate(
    rules: &MappingRules,
    registry: &TransformerRegistry,
    record: &ExternalRecord,
) -> ImportCandidate {
    let resolution = Resolver::new(rules).resolve(record);
    let mut draft = FieldMap::new();
    let mut field_errors = BTreeMap::new();
    for (field, column) in &resolution.assignments {
        match registry.apply(field, column) {
            Ok(Some(value)) => {
                draft.insert(field.clone(), value);
            }
            Ok(None) => {}
            Err(err) => {
                field_errors.insert(field.clone(), err.to_string());
            }
        }
    }
    let missing_required = missing_required(rules, &draft);
    ImportCandidate {
        external_id: record.external_id.clone(),
        record: record.clone(),
        draft,
        missing_required,
        field_errors,
        duplicate_of: None,
    }
}

/// Merges completion values into a candidate, producing a new one.
///
/// An override wins over the resolved value and clears any transform
/// error recorded for its field; an empty override removes the field.
/// Required coverage is recomputed against the merged draft.
pub fn apply_overrides(
    rules: &MappingRules,
    candidate: &ImportCandidate,
    overrides: &FieldMap,
) -> ImportCandidate {
    let mut merged = candidate.clone();
    for (field, value) in overrides {
        merged.field_errors.remove(field);
        if value.is_empty() {
            merged.draft.remove(field);
        } else {
            merged.draft.insert(field.clone(), value.clone());
        }
    }
    merged.missing_required = missing_required(rules, &merged.draft);
    merged
}

/// Required fields the draft does not cover, in rule declaration order.
pub fn missing_required(rules: &MappingRules, draft: &FieldMap) -> Vec<FieldName> {
    rules
        .required
        .iter()
        .filter(|field| match draft.get(*field) {
            Some(value) => value.is_empty(),
            None => true,
        })
        .cloned()
        .collect()
}
