//! Interactive one-record-at-a-time import flow.

use tracing::debug;

use boardsync_model::{CommitOutcome, EntityId, FieldMap, ImportCandidate};
use boardsync_store::{EntityStore, RecordSource};

use crate::candidate::apply_overrides;
use crate::error::SessionError;
use crate::import::Importer;

/// Where an interactive import stands.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Waiting for a record to be picked.
    Selecting,
    /// The picked record cannot commit yet; the candidate carries what is
    /// missing.
    Completing { candidate: ImportCandidate },
    /// The record was imported.
    Success { entity_id: EntityId },
    /// The attempt failed. Terminal until `reset`.
    Error { message: String },
}

impl SessionState {
    /// Short name used in logs and transition errors.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Selecting => "selecting",
            SessionState::Completing { .. } => "completing",
            SessionState::Success { .. } => "success",
            SessionState::Error { .. } => "error",
        }
    }
}

/// Single-record workflow on top of [`Importer`].
///
/// `select` commits a clean record outright, parks an incomplete one in
/// `Completing`, and refuses a duplicate. `complete` merges the
/// operator's values into a parked candidate and retries. `reset` is the
/// only way back to `Selecting`; data problems land in the state, not in
/// `Err`.
pub struct ImportSession<'a, S, R> {
    importer: Importer<'a, S, R>,
    state: SessionState,
    last_external_id: Option<String>,
}

impl<'a, S: EntityStore, R: RecordSource> ImportSession<'a, S, R> {
    pub fn new(importer: Importer<'a, S, R>) -> Self {
        Self {
            importer,
            state: SessionState::Selecting,
            last_external_id: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Id handed to the last `select`, kept until `reset`.
    pub fn last_external_id(&self) -> Option<&str> {
        self.last_external_id.as_deref()
    }

    /// Picks a record to import. Only legal while `Selecting`.
    pub fn select(&mut self, external_id: &str) -> Result<&SessionState, SessionError> {
        if !matches!(self.state, SessionState::Selecting) {
            return Err(SessionError::InvalidTransition {
                operation: "select",
                state: self.state.name(),
            });
        }
        self.last_external_id = Some(external_id.to_string());
        let candidate = match self.importer.resolve_one(external_id) {
            Ok(candidate) => candidate,
            Err(err) => {
                self.state = SessionState::Error {
                    message: err.to_string(),
                };
                return Ok(&self.state);
            }
        };
        if let Some(matched_id) = &candidate.duplicate_of {
            self.state = SessionState::Error {
                message: format!("record {external_id} duplicates entity {matched_id}"),
            };
            return Ok(&self.state);
        }
        if !candidate.is_valid() {
            debug!(
                external_id,
                missing = candidate.missing_required.len(),
                field_errors = candidate.field_errors.len(),
                "record needs completion"
            );
            self.state = SessionState::Completing { candidate };
            return Ok(&self.state);
        }
        self.state = self.commit_candidate(&candidate);
        Ok(&self.state)
    }

    /// Merges completion values into the parked candidate and retries.
    /// Only legal while `Completing`; a still-incomplete candidate stays
    /// parked with the narrowed gap list.
    pub fn complete(&mut self, overrides: &FieldMap) -> Result<&SessionState, SessionError> {
        let SessionState::Completing { candidate } = &self.state else {
            return Err(SessionError::InvalidTransition {
                operation: "complete",
                state: self.state.name(),
            });
        };
        let merged = apply_overrides(&self.importer.profile().rules, candidate, overrides);
        if !merged.is_valid() {
            self.state = SessionState::Completing { candidate: merged };
            return Ok(&self.state);
        }
        self.state = self.commit_candidate(&merged);
        Ok(&self.state)
    }

    /// Abandons whatever the session holds and returns to `Selecting`.
    /// Legal from any state.
    pub fn reset(&mut self) {
        self.state = SessionState::Selecting;
        self.last_external_id = None;
    }

    /// Commit re-checks duplicates against the store as it is NOW, not as
    /// it was at `select` time.
    fn commit_candidate(&self, candidate: &ImportCandidate) -> SessionState {
        let batch = match self.importer.commit(std::slice::from_ref(candidate)) {
            Ok(batch) => batch,
            Err(err) => {
                return SessionState::Error {
                    message: err.to_string(),
                };
            }
        };
        match batch.entries.into_iter().next().map(|entry| entry.outcome) {
            Some(CommitOutcome::Imported { entity_id }) => SessionState::Success { entity_id },
            Some(CommitOutcome::SkippedDuplicate { matched_id }) => SessionState::Error {
                message: format!(
                    "record {} duplicates entity {matched_id}",
                    candidate.external_id
                ),
            },
            Some(outcome) => SessionState::Error {
                message: format!(
                    "record {} was not imported ({})",
                    candidate.external_id,
                    outcome.label()
                ),
            },
            None => SessionState::Error {
                message: format!("record {} was not imported", candidate.external_id),
            },
        }
    }
}
