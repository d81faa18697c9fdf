//! Batch preview and sequential commit against a store/source pair.

use std::fmt;

use tracing::{debug, info, info_span};

use boardsync_map::{MappingRules, TransformerRegistry};
use boardsync_model::{
    BatchEntry, BatchError, CommitOutcome, Entity, FetchFailure, FieldName, ImportBatchResult,
    ImportCandidate, NewEntity, PreviewReport,
};
use boardsync_store::{EntityStore, RecordSource};

use crate::candidate::build_candidate;
use crate::dedupe::{CompositeKey, DuplicateRule, find_duplicate};
use crate::error::EngineError;

/// Everything needed to turn records of one kind into entities: the rule
/// set, its transformer registry, and the duplicate rule.
pub struct ImportProfile {
    pub rules: MappingRules,
    pub transforms: TransformerRegistry,
    pub duplicate_rule: Box<dyn DuplicateRule>,
}

impl ImportProfile {
    /// Profile using the rule set's own transforms and duplicate key.
    pub fn from_rules(rules: MappingRules) -> Self {
        let transforms = TransformerRegistry::from_rules(&rules);
        let duplicate_rule = Box::new(CompositeKey::from_rules(&rules));
        Self {
            rules,
            transforms,
            duplicate_rule,
        }
    }

    /// Swaps in a custom duplicate rule.
    pub fn with_duplicate_rule(mut self, rule: Box<dyn DuplicateRule>) -> Self {
        self.duplicate_rule = rule;
        self
    }
}

impl fmt::Debug for ImportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportProfile")
            .field("kind", &self.rules.kind)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}

/// Runs previews and commits for one entity kind.
pub struct Importer<'a, S, R> {
    store: &'a S,
    source: &'a R,
    profile: ImportProfile,
}

impl<'a, S: EntityStore, R: RecordSource> Importer<'a, S, R> {
    pub fn new(store: &'a S, source: &'a R, profile: ImportProfile) -> Self {
        Self {
            store,
            source,
            profile,
        }
    }

    pub fn profile(&self) -> &ImportProfile {
        &self.profile
    }

    /// Builds candidates for the given ids without writing anything.
    ///
    /// A fetch failure is recorded for its id and the batch moves on.
    /// Previewing the same ids again against unchanged external and
    /// persisted state returns the same report.
    pub fn preview(&self, external_ids: &[&str]) -> Result<PreviewReport, EngineError> {
        let span = info_span!(
            "preview",
            kind = %self.profile.rules.kind,
            requested = external_ids.len()
        );
        let _guard = span.enter();

        let snapshot = self.store.snapshot(&self.profile.rules.kind)?;
        let mut report = PreviewReport::default();
        for &external_id in external_ids {
            let record = match self.source.fetch_record(external_id) {
                Ok(record) => record,
                Err(err) => {
                    debug!(external_id, error = %err, "fetch failed");
                    report.failures.push(FetchFailure {
                        external_id: external_id.to_string(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            let mut candidate =
                build_candidate(&self.profile.rules, &self.profile.transforms, &record);
            candidate.duplicate_of = find_duplicate(
                &candidate.draft,
                &snapshot,
                self.profile.duplicate_rule.as_ref(),
            )
            .map(|existing| existing.id.clone());
            debug!(
                external_id,
                valid = candidate.is_valid(),
                duplicate = candidate.is_duplicate(),
                "candidate built"
            );
            report.candidates.push(candidate);
        }
        info!(
            candidates = report.candidates.len(),
            ready = report.ready_count(),
            duplicates = report.duplicate_count(),
            invalid = report.invalid_count(),
            failures = report.failures.len(),
            "preview complete"
        );
        Ok(report)
    }

    /// The single-candidate path: fetch, build, duplicate-check against
    /// the current snapshot.
    pub fn resolve_one(&self, external_id: &str) -> Result<ImportCandidate, EngineError> {
        let record = self.source.fetch_record(external_id)?;
        let mut candidate =
            build_candidate(&self.profile.rules, &self.profile.transforms, &record);
        let snapshot = self.store.snapshot(&self.profile.rules.kind)?;
        candidate.duplicate_of = find_duplicate(
            &candidate.draft,
            &snapshot,
            self.profile.duplicate_rule.as_ref(),
        )
        .map(|existing| existing.id.clone());
        Ok(candidate)
    }

    /// Commits candidates one at a time, in the order given.
    ///
    /// Each candidate is duplicate-checked against the persisted snapshot
    /// and then against whatever this call already imported, so a batch
    /// holding the same record twice imports it once. One candidate's
    /// failure never rolls back or blocks its siblings; the result lists
    /// every outcome in order.
    pub fn commit(&self, candidates: &[ImportCandidate]) -> Result<ImportBatchResult, EngineError> {
        let span = info_span!(
            "commit",
            kind = %self.profile.rules.kind,
            candidates = candidates.len()
        );
        let _guard = span.enter();

        let snapshot = self.store.snapshot(&self.profile.rules.kind)?;
        let rule = self.profile.duplicate_rule.as_ref();
        let mut committed: Vec<Entity> = Vec::new();
        let mut result = ImportBatchResult::default();
        for candidate in candidates {
            let duplicate = find_duplicate(&candidate.draft, &snapshot, rule)
                .or_else(|| find_duplicate(&candidate.draft, &committed, rule));
            let outcome = if let Some(existing) = duplicate {
                debug!(
                    external_id = %candidate.external_id,
                    matched_id = %existing.id,
                    "skipped duplicate"
                );
                CommitOutcome::SkippedDuplicate {
                    matched_id: existing.id.clone(),
                }
            } else if !candidate.is_valid() {
                debug!(external_id = %candidate.external_id, "failed validation");
                CommitOutcome::FailedValidation {
                    missing: candidate.missing_required.clone(),
                    field_errors: candidate.field_errors.clone(),
                }
            } else {
                let new_entity = NewEntity {
                    kind: self.profile.rules.kind.clone(),
                    external_id: Some(candidate.external_id.clone()),
                    fields: candidate.draft.clone(),
                };
                match self.store.create(new_entity) {
                    Ok(entity) => {
                        debug!(
                            external_id = %candidate.external_id,
                            entity_id = %entity.id,
                            "imported"
                        );
                        let outcome = CommitOutcome::Imported {
                            entity_id: entity.id.clone(),
                        };
                        committed.push(entity);
                        outcome
                    }
                    Err(err) => {
                        debug!(external_id = %candidate.external_id, error = %err, "persist failed");
                        CommitOutcome::FailedPersist {
                            message: err.to_string(),
                        }
                    }
                }
            };
            if let Some(message) = failure_message(&outcome) {
                result.errors.push(BatchError {
                    external_id: candidate.external_id.clone(),
                    message,
                });
            }
            result.entries.push(BatchEntry {
                external_id: candidate.external_id.clone(),
                outcome,
            });
        }
        info!(
            imported = result.imported_count(),
            skipped = result.skipped_count(),
            failed_validation = result.failed_validation_count(),
            failed_persist = result.failed_persist_count(),
            "commit complete"
        );
        Ok(result)
    }
}

fn failure_message(outcome: &CommitOutcome) -> Option<String> {
    match outcome {
        CommitOutcome::FailedValidation {
            missing,
            field_errors,
        } => {
            let mut parts = Vec::new();
            if !missing.is_empty() {
                parts.push(format!("missing required: {}", join_fields(missing)));
            }
            for (field, message) in field_errors {
                parts.push(format!("{field}: {message}"));
            }
            Some(parts.join("; "))
        }
        CommitOutcome::FailedPersist { message } => Some(message.clone()),
        CommitOutcome::Imported { .. } | CommitOutcome::SkippedDuplicate { .. } => None,
    }
}

fn join_fields(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(FieldName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
