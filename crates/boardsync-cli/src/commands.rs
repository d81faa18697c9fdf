use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use serde_json::Value;
use tracing::{debug, info_span};

use boardsync_engine::{ImportProfile, Importer, apply_overrides, sync_back};
use boardsync_map::{MappingRules, TransformSpec, TransformerRegistry, coerce_override};
use boardsync_model::{
    EntityId, FieldMap, FieldName, ImportBatchResult, ImportCandidate, PreviewReport,
};
use boardsync_store::{JsonSource, JsonStore};

use crate::cli::{CommitArgs, FieldsArgs, PreviewArgs, SyncBackArgs};
use crate::logging::redact_value;
use crate::summary::{SyncRow, apply_table_style};

pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let rules = load_rules(&args.rules)?;
    println!("Kind: {}", rules.kind);
    let mut table = Table::new();
    table.set_header(vec![
        "Field",
        "Titles",
        "Type tags",
        "Id patterns",
        "Transform",
        "Required",
        "Duplicate key",
    ]);
    apply_table_style(&mut table);
    for row in field_rows(&rules) {
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

pub fn run_preview(args: &PreviewArgs) -> Result<PreviewReport> {
    let rules = load_rules(&args.rules)?;
    let store = JsonStore::open(&args.store)
        .with_context(|| format!("open entity store {}", args.store.display()))?;
    let source = JsonSource::open(&args.board)
        .with_context(|| format!("open board file {}", args.board.display()))?;
    let ids = requested_ids(&args.ids, &source);
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(rules));
    let report = importer.preview(&id_refs)?;
    for candidate in &report.candidates {
        debug!(
            external_id = %candidate.external_id,
            draft = %redacted_draft(&candidate.draft),
            "resolved draft"
        );
    }
    Ok(report)
}

pub fn run_commit(args: &CommitArgs) -> Result<ImportBatchResult> {
    let rules = load_rules(&args.rules)?;
    let overrides = match &args.overrides {
        Some(path) => Some(load_overrides(path, &rules)?),
        None => None,
    };
    let store = JsonStore::open(&args.store)
        .with_context(|| format!("open entity store {}", args.store.display()))?;
    let source = JsonSource::open(&args.board)
        .with_context(|| format!("open board file {}", args.board.display()))?;
    let ids = requested_ids(&args.ids, &source);
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(rules));
    let report = importer.preview(&id_refs)?;
    let mut candidates = report.candidates;
    if let Some(overrides) = &overrides {
        candidates = candidates
            .into_iter()
            .map(|candidate| match overrides.get(&candidate.external_id) {
                Some(values) => apply_overrides(&importer.profile().rules, &candidate, values),
                None => candidate,
            })
            .collect();
    }
    if args.valid_only {
        candidates.retain(ImportCandidate::is_valid);
    }
    let result = importer.commit(&candidates)?;
    Ok(result)
}

pub fn run_sync_back(args: &SyncBackArgs) -> Result<Vec<SyncRow>> {
    let rules = load_rules(&args.rules)?;
    let registry = TransformerRegistry::from_rules(&rules);
    let store = JsonStore::open(&args.store)
        .with_context(|| format!("open entity store {}", args.store.display()))?;
    let source = JsonSource::open(&args.board)
        .with_context(|| format!("open board file {}", args.board.display()))?;
    let span = info_span!("sync_back", entities = args.entity_ids.len());
    let _guard = span.enter();
    let mut rows = Vec::new();
    for raw_id in &args.entity_ids {
        let row = match EntityId::new(raw_id.as_str()) {
            Ok(id) => match sync_back(&store, &source, &rules, &registry, &id) {
                Ok(entity) => SyncRow {
                    entity_id: entity.id.to_string(),
                    external_id: entity.external_id.clone().unwrap_or_default(),
                    synced_at: entity
                        .last_synced_at
                        .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
                    error: None,
                },
                Err(err) => failed_sync_row(raw_id, err.to_string()),
            },
            Err(err) => failed_sync_row(raw_id, err.to_string()),
        };
        rows.push(row);
    }
    Ok(rows)
}

fn load_rules(path: &Path) -> Result<MappingRules> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read rules file {}", path.display()))?;
    let rules: MappingRules = serde_json::from_str(&raw)
        .with_context(|| format!("parse rules file {}", path.display()))?;
    rules
        .validate()
        .with_context(|| format!("validate rules file {}", path.display()))?;
    Ok(rules)
}

/// Overrides file shape: record id to field name to raw value, for example
/// `{"99": {"coach": "A. Lee"}}`. Values are coerced through the field's
/// declared transform.
fn load_overrides(path: &Path, rules: &MappingRules) -> Result<BTreeMap<String, FieldMap>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read overrides file {}", path.display()))?;
    let parsed: BTreeMap<String, BTreeMap<String, Value>> = serde_json::from_str(&raw)
        .with_context(|| format!("parse overrides file {}", path.display()))?;
    let mut overrides = BTreeMap::new();
    for (external_id, values) in parsed {
        let mut fields = FieldMap::new();
        for (name, value) in values {
            let field = FieldName::new(name)
                .with_context(|| format!("override field for record {external_id}"))?;
            let coerced = coerce_override(rules.transform_for(&field), &value)
                .with_context(|| format!("override value for {field} on record {external_id}"))?;
            fields.insert(field, coerced);
        }
        overrides.insert(external_id, fields);
    }
    Ok(overrides)
}

fn requested_ids(ids: &[String], source: &JsonSource) -> Vec<String> {
    if ids.is_empty() {
        source.record_ids()
    } else {
        ids.to_vec()
    }
}

fn field_rows(rules: &MappingRules) -> Vec<Vec<String>> {
    let mut fields = rules.known_fields();
    fields.extend(rules.required.iter().cloned());
    fields
        .iter()
        .map(|field| {
            let titles = rules
                .titles
                .iter()
                .find(|rule| rule.field == *field)
                .map(|rule| rule.any_of.join(", "))
                .unwrap_or_else(|| "-".to_string());
            let tags: Vec<&str> = rules
                .types
                .iter()
                .filter(|(_, candidates)| candidates.contains(field))
                .map(|(tag, _)| tag.as_str())
                .collect();
            let patterns: Vec<&str> = rules
                .id_patterns
                .iter()
                .filter(|rule| rule.field == *field)
                .map(|rule| rule.pattern.as_str())
                .collect();
            vec![
                field.to_string(),
                titles,
                join_or_dash(&tags),
                join_or_dash(&patterns),
                rules
                    .transform_for(field)
                    .map_or("-", TransformSpec::as_str)
                    .to_string(),
                mark(rules.required.contains(field)),
                mark(rules.duplicate_key.contains(field)),
            ]
        })
        .collect()
}

fn failed_sync_row(raw_id: &str, message: String) -> SyncRow {
    SyncRow {
        entity_id: raw_id.to_string(),
        external_id: "-".to_string(),
        synced_at: None,
        error: Some(message),
    }
}

fn redacted_draft(draft: &FieldMap) -> String {
    draft
        .iter()
        .map(|(field, value)| format!("{field}={}", redact_value(&value.to_string())))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_or_dash(items: &[&str]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn mark(present: bool) -> String {
    if present {
        "✓".to_string()
    } else {
        "-".to_string()
    }
}
