//! Three-tier column resolution.

use std::collections::{BTreeMap, BTreeSet};

use boardsync_model::{Column, ExternalRecord, FieldName};

use crate::rules::MappingRules;
use crate::utils::title_matches;

/// Outcome of resolving one record against one rule set.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Claimed column per resolved field. Fields no tier could resolve are
    /// simply absent.
    pub assignments: BTreeMap<FieldName, Column>,
    /// Columns no field claimed, in record order.
    pub unclaimed: Vec<Column>,
}

/// Assigns each internal field a source column, first claim wins.
///
/// Three strictly ordered passes: titles, then type tags, then id
/// patterns. A claimed column is out of play for later passes and a
/// resolved field is never reassigned, so precedence is a property of the
/// algorithm rather than of insertion order. Output depends only on the
/// rule set and the record's column order.
pub struct Resolver<'a> {
    rules: &'a MappingRules,
}

impl<'a> Resolver<'a> {
    pub fn new(rules: &'a MappingRules) -> Self {
        Self { rules }
    }

    pub fn resolve(&self, record: &ExternalRecord) -> Resolution {
        let mut assignments: BTreeMap<FieldName, Column> = BTreeMap::new();
        let mut claimed: BTreeSet<usize> = BTreeSet::new();

        // Pass 1: titles, in rule declaration order.
        for rule in &self.rules.titles {
            if assignments.contains_key(&rule.field) {
                continue;
            }
            let matched = record.columns.iter().enumerate().find(|(idx, column)| {
                !claimed.contains(idx)
                    && column.title.as_deref().is_some_and(|title| {
                        rule.any_of
                            .iter()
                            .any(|candidate| title_matches(title, candidate))
                    })
            });
            if let Some((idx, column)) = matched {
                claimed.insert(idx);
                assignments.insert(rule.field.clone(), column.clone());
            }
        }

        // Pass 2: declared type tags, in record order.
        for (idx, column) in record.columns.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            let Some(tag) = column.kind.as_deref().map(str::trim).filter(|tag| !tag.is_empty())
            else {
                continue;
            };
            let Some(candidates) = self.fields_for_type(tag) else {
                continue;
            };
            if let Some(field) = candidates
                .iter()
                .find(|field| !assignments.contains_key(*field))
            {
                claimed.insert(idx);
                assignments.insert(field.clone(), column.clone());
            }
        }

        // Pass 3: id patterns, in rule order per column.
        for (idx, column) in record.columns.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            let matched = self.rules.id_patterns.iter().find(|rule| {
                !assignments.contains_key(&rule.field) && column.id.contains(&rule.pattern)
            });
            if let Some(rule) = matched {
                claimed.insert(idx);
                assignments.insert(rule.field.clone(), column.clone());
            }
        }

        let unclaimed = record
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| !claimed.contains(idx))
            .map(|(_, column)| column.clone())
            .collect();

        Resolution {
            assignments,
            unclaimed,
        }
    }

    fn fields_for_type(&self, tag: &str) -> Option<&Vec<FieldName>> {
        self.rules
            .types
            .iter()
            .find(|(rule_tag, _)| rule_tag.eq_ignore_ascii_case(tag))
            .map(|(_, fields)| fields)
    }
}
