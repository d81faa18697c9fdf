use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EntityId, FieldName};

/// Per-candidate commit outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
    Imported {
        entity_id: EntityId,
    },
    SkippedDuplicate {
        matched_id: EntityId,
    },
    FailedValidation {
        missing: Vec<FieldName>,
        field_errors: BTreeMap<FieldName, String>,
    },
    FailedPersist {
        message: String,
    },
}

impl CommitOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CommitOutcome::Imported { .. } => "imported",
            CommitOutcome::SkippedDuplicate { .. } => "skipped_duplicate",
            CommitOutcome::FailedValidation { .. } => "failed_validation",
            CommitOutcome::FailedPersist { .. } => "failed_persist",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CommitOutcome::FailedValidation { .. } | CommitOutcome::FailedPersist { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub external_id: String,
    pub outcome: CommitOutcome,
}

/// One failed candidate, in commit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    pub external_id: String,
    pub message: String,
}

/// The immutable result of one commit call: one entry per candidate, in
/// the order they were committed, plus the ordered failure list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportBatchResult {
    pub entries: Vec<BatchEntry>,
    pub errors: Vec<BatchError>,
}

impl ImportBatchResult {
    pub fn imported_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, CommitOutcome::Imported { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, CommitOutcome::SkippedDuplicate { .. }))
    }

    pub fn failed_validation_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, CommitOutcome::FailedValidation { .. }))
    }

    pub fn failed_persist_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, CommitOutcome::FailedPersist { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|entry| entry.outcome.is_failure())
    }

    fn count(&self, matcher: impl Fn(&CommitOutcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| matcher(&entry.outcome))
            .count()
    }
}
