use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EntityId, ExternalRecord, FieldMap, FieldName};

/// The result of resolving, transforming, and validating one external
/// record against one rule set.
///
/// Candidates are never mutated in place: completing missing fields
/// produces a new candidate with the overrides merged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCandidate {
    pub external_id: String,
    pub record: ExternalRecord,
    /// Every field that resolved to a present value.
    pub draft: FieldMap,
    pub missing_required: Vec<FieldName>,
    pub field_errors: BTreeMap<FieldName, String>,
    pub duplicate_of: Option<EntityId>,
}

impl ImportCandidate {
    /// Valid when nothing required is missing and no transform failed.
    pub fn is_valid(&self) -> bool {
        self.missing_required.is_empty() && self.field_errors.is_empty()
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate_of.is_some()
    }
}

/// A record id whose fetch failed during preview; the batch continues
/// without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchFailure {
    pub external_id: String,
    pub message: String,
}

/// Result of one preview call: candidates in request order, plus the ids
/// that could not be fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewReport {
    pub candidates: Vec<ImportCandidate>,
    pub failures: Vec<FetchFailure>,
}

impl PreviewReport {
    /// Candidates that would commit as-is.
    pub fn ready_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|candidate| candidate.is_valid() && !candidate.is_duplicate())
            .count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|candidate| candidate.is_duplicate())
            .count()
    }

    pub fn invalid_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|candidate| !candidate.is_valid())
            .count()
    }
}
