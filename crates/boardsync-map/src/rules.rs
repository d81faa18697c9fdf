//! Field mapping rules for one entity kind.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use boardsync_model::FieldName;

use crate::MapError;

/// One title-tier rule: the field claims the first unclaimed column whose
/// title matches any listed candidate. Declaration order drives the title
/// pass, and the first candidate doubles as the preferred sync-back title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRule {
    pub field: FieldName,
    pub any_of: Vec<String>,
}

/// One id-pattern-tier rule: a substring of the opaque column id claims the
/// column for the field. Several patterns may target the same field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdPatternRule {
    pub pattern: String,
    pub field: FieldName,
}

/// Builtin transform selection for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformSpec {
    Text,
    Number,
    Date,
    Flag,
    List,
}

impl TransformSpec {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformSpec::Text => "text",
            TransformSpec::Number => "number",
            TransformSpec::Date => "date",
            TransformSpec::Flag => "flag",
            TransformSpec::List => "list",
        }
    }
}

/// Field mapping rules for one entity kind.
///
/// The three tiers may disagree about a column; precedence is fixed
/// (title, then type, then id pattern) and applied by the resolver.
/// Rules are immutable once loaded: the resolver takes them by reference
/// and never mutates shared mapping state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRules {
    pub kind: String,
    #[serde(default)]
    pub titles: Vec<TitleRule>,
    /// Source type tag (case-insensitive) to candidate fields in priority
    /// order.
    #[serde(default)]
    pub types: BTreeMap<String, Vec<FieldName>>,
    #[serde(default)]
    pub id_patterns: Vec<IdPatternRule>,
    #[serde(default)]
    pub transforms: BTreeMap<FieldName, TransformSpec>,
    #[serde(default)]
    pub required: Vec<FieldName>,
    /// Composite natural key for the default duplicate predicate; empty
    /// means no default predicate.
    #[serde(default)]
    pub duplicate_key: Vec<FieldName>,
}

impl MappingRules {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            titles: Vec::new(),
            types: BTreeMap::new(),
            id_patterns: Vec::new(),
            transforms: BTreeMap::new(),
            required: Vec::new(),
            duplicate_key: Vec::new(),
        }
    }

    pub fn with_title(mut self, field: FieldName, any_of: &[&str]) -> Self {
        self.titles.push(TitleRule {
            field,
            any_of: any_of.iter().map(|title| (*title).to_string()).collect(),
        });
        self
    }

    pub fn with_type(mut self, tag: impl Into<String>, fields: Vec<FieldName>) -> Self {
        self.types.insert(tag.into(), fields);
        self
    }

    pub fn with_id_pattern(mut self, pattern: impl Into<String>, field: FieldName) -> Self {
        self.id_patterns.push(IdPatternRule {
            pattern: pattern.into(),
            field,
        });
        self
    }

    pub fn with_transform(mut self, field: FieldName, spec: TransformSpec) -> Self {
        self.transforms.insert(field, spec);
        self
    }

    pub fn with_required(mut self, fields: Vec<FieldName>) -> Self {
        self.required = fields;
        self
    }

    pub fn with_duplicate_key(mut self, fields: Vec<FieldName>) -> Self {
        self.duplicate_key = fields;
        self
    }

    /// Every field some tier can resolve.
    pub fn known_fields(&self) -> BTreeSet<FieldName> {
        let mut fields = BTreeSet::new();
        for rule in &self.titles {
            fields.insert(rule.field.clone());
        }
        for candidates in self.types.values() {
            fields.extend(candidates.iter().cloned());
        }
        for rule in &self.id_patterns {
            fields.insert(rule.field.clone());
        }
        fields
    }

    pub fn transform_for(&self, field: &FieldName) -> Option<TransformSpec> {
        self.transforms.get(field).copied()
    }

    /// Structural checks applied before rules are stored or used.
    ///
    /// Required fields are allowed to be unknown to every tier: they can
    /// still be supplied through completion overrides. Transform and
    /// duplicate-key entries for unresolvable fields are dead configuration
    /// and rejected.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.kind.trim().is_empty() {
            return Err(invalid("kind must not be empty"));
        }
        let mut title_fields = BTreeSet::new();
        for rule in &self.titles {
            if !title_fields.insert(&rule.field) {
                return Err(invalid(format!(
                    "field {} has more than one title rule",
                    rule.field
                )));
            }
            if rule.any_of.is_empty() {
                return Err(invalid(format!(
                    "title rule for {} lists no titles",
                    rule.field
                )));
            }
            if rule.any_of.iter().any(|title| title.trim().is_empty()) {
                return Err(invalid(format!(
                    "title rule for {} contains a blank title",
                    rule.field
                )));
            }
        }
        for (tag, fields) in &self.types {
            if tag.trim().is_empty() {
                return Err(invalid("type rule with a blank type tag"));
            }
            if fields.is_empty() {
                return Err(invalid(format!("type rule {:?} lists no fields", tag)));
            }
        }
        for rule in &self.id_patterns {
            if rule.pattern.trim().is_empty() {
                return Err(invalid(format!(
                    "id pattern rule for {} has an empty pattern",
                    rule.field
                )));
            }
        }
        let known = self.known_fields();
        for field in self.transforms.keys() {
            if !known.contains(field) {
                return Err(invalid(format!(
                    "transform declared for unresolvable field {}",
                    field
                )));
            }
        }
        for field in &self.duplicate_key {
            if !known.contains(field) {
                return Err(invalid(format!(
                    "duplicate key uses unresolvable field {}",
                    field
                )));
            }
        }
        Ok(())
    }
}

fn invalid(detail: impl Into<String>) -> MapError {
    MapError::InvalidRules {
        detail: detail.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldName {
        FieldName::new(name).expect("field name")
    }

    fn visit_rules() -> MappingRules {
        MappingRules::new("visit")
            .with_title(field("date"), &["Date", "Visit Date"])
            .with_title(field("school"), &["School"])
            .with_transform(field("date"), TransformSpec::Date)
            .with_required(vec![field("date"), field("school")])
            .with_duplicate_key(vec![field("date"), field("school")])
    }

    #[test]
    fn valid_rules_pass() {
        visit_rules().validate().expect("rules valid");
    }

    #[test]
    fn duplicate_title_rules_rejected() {
        let rules = visit_rules().with_title(field("date"), &["Day"]);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn transform_for_unresolvable_field_rejected() {
        let rules = visit_rules().with_transform(field("phantom"), TransformSpec::Text);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn required_may_be_override_only() {
        let mut rules = visit_rules();
        rules.required.push(field("coach"));
        rules.validate().expect("override-only required field allowed");
    }

    #[test]
    fn rules_round_trip_as_json() {
        let rules = visit_rules();
        let json = serde_json::to_string(&rules).expect("serialize rules");
        let round: MappingRules = serde_json::from_str(&json).expect("deserialize rules");
        assert_eq!(round, rules);
    }
}
