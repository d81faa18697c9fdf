//! File-system repository for mapping rule sets.
//!
//! One JSON file per entity kind, named `<kind>.json` with the kind
//! normalized for filename safety. Stored files carry a save timestamp and
//! a format version alongside the rules themselves.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::rules::MappingRules;

/// Current rules file format version.
pub const RULES_VERSION: u32 = 1;

fn default_version() -> u32 {
    RULES_VERSION
}

/// Rules plus repository metadata, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRules {
    #[serde(flatten)]
    pub rules: MappingRules,
    pub saved_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
}

/// Metadata about one stored rule set.
#[derive(Debug, Clone)]
pub struct RulesSummary {
    pub kind: String,
    pub file_path: PathBuf,
    pub field_count: usize,
    pub required_count: usize,
}

/// Directory-based storage for mapping rules, one JSON file per kind.
#[derive(Debug, Clone)]
pub struct RulesRepository {
    base_dir: PathBuf,
}

impl RulesRepository {
    /// Creates the repository, and its directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, MapError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| MapError::Io {
            operation: "create rules directory",
            path: base_dir.clone(),
            source,
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Validates and saves a rule set, replacing any stored one for the
    /// same kind.
    pub fn save(&self, rules: &MappingRules) -> Result<PathBuf, MapError> {
        rules.validate()?;
        let stored = StoredRules {
            rules: rules.clone(),
            saved_at: Utc::now(),
            version: RULES_VERSION,
        };
        let path = self.rules_path(&rules.kind);
        let json = serde_json::to_string_pretty(&stored).map_err(|source| MapError::Serde {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| MapError::Io {
            operation: "write rules file",
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn load(&self, kind: &str) -> Result<MappingRules, MapError> {
        Ok(self.load_stored(kind)?.rules)
    }

    pub fn load_stored(&self, kind: &str) -> Result<StoredRules, MapError> {
        let path = self.rules_path(kind);
        if !path.exists() {
            return Err(MapError::NotFound {
                kind: kind.to_string(),
            });
        }
        let contents = fs::read_to_string(&path).map_err(|source| MapError::Io {
            operation: "read rules file",
            path: path.clone(),
            source,
        })?;
        let stored: StoredRules =
            serde_json::from_str(&contents).map_err(|source| MapError::Serde { path, source })?;
        Ok(stored)
    }

    /// Lists stored rule sets, sorted by kind. Files that do not parse as
    /// rules are skipped.
    pub fn list(&self) -> Result<Vec<RulesSummary>, MapError> {
        let entries = fs::read_dir(&self.base_dir).map_err(|source| MapError::Io {
            operation: "read rules directory",
            path: self.base_dir.clone(),
            source,
        })?;

        let mut summaries = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| MapError::Io {
                operation: "read rules directory",
                path: self.base_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Ok(contents) = fs::read_to_string(&path) else {
                continue;
            };
            if let Ok(stored) = serde_json::from_str::<StoredRules>(&contents) {
                summaries.push(RulesSummary {
                    kind: stored.rules.kind.clone(),
                    file_path: path,
                    field_count: stored.rules.known_fields().len(),
                    required_count: stored.rules.required.len(),
                });
            }
        }

        summaries.sort_by(|a, b| a.kind.cmp(&b.kind));
        Ok(summaries)
    }

    /// Deletes the rules for a kind; returns whether anything was removed.
    pub fn delete(&self, kind: &str) -> Result<bool, MapError> {
        let path = self.rules_path(kind);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| MapError::Io {
            operation: "delete rules file",
            path,
            source,
        })?;
        Ok(true)
    }

    pub fn exists(&self, kind: &str) -> bool {
        self.rules_path(kind).exists()
    }

    fn rules_path(&self, kind: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_kind(kind)))
    }
}

/// Normalizes a kind for use in filenames.
fn normalize_kind(kind: &str) -> String {
    kind.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
