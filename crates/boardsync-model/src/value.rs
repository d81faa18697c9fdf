use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::FieldName;

/// A typed internal field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Flag(bool),
    List(Vec<String>),
}

impl FieldValue {
    /// Presence rule: empty text and empty lists count as absent; numbers,
    /// dates, and flags are always present.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(_) | FieldValue::Date(_) | FieldValue::Flag(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => write!(f, "{}", number),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::Flag(flag) => write!(f, "{}", flag),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Field container shared by drafts and persisted entities. `BTreeMap`
/// keeps iteration order deterministic.
pub type FieldMap = BTreeMap<FieldName, FieldValue>;
