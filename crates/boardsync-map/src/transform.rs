//! Value transforms between external columns and typed field values.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use boardsync_model::{Column, FieldName, FieldValue};

use crate::error::TransformError;
use crate::rules::{MappingRules, TransformSpec};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Converts one claimed column into a typed field value.
///
/// `forward` returns `Ok(None)` when the column is blank; blank input is
/// not a conversion failure. `reverse` renders a value for sync-back and
/// defaults to the display form.
pub trait ValueTransform: Send + Sync {
    fn forward(&self, column: &Column) -> Result<Option<FieldValue>, TransformError>;

    fn reverse(&self, value: &FieldValue) -> Value {
        Value::String(value.to_string())
    }
}

/// Trimmed column text, verbatim. Never fails.
pub struct TextTransform;

impl ValueTransform for TextTransform {
    fn forward(&self, column: &Column) -> Result<Option<FieldValue>, TransformError> {
        Ok(column
            .text_trimmed()
            .map(|text| FieldValue::Text(text.to_string())))
    }
}

/// Numeric text, falling back to a numeric raw value.
pub struct NumberTransform;

impl ValueTransform for NumberTransform {
    fn forward(&self, column: &Column) -> Result<Option<FieldValue>, TransformError> {
        if let Some(text) = column.text_trimmed() {
            let number = text
                .parse::<f64>()
                .map_err(|_| TransformError::parse(format!("{:?} as a number", text)))?;
            return Ok(Some(FieldValue::Number(number)));
        }
        match &column.value {
            Some(Value::Number(number)) => Ok(number.as_f64().map(FieldValue::Number)),
            _ => Ok(None),
        }
    }

    fn reverse(&self, value: &FieldValue) -> Value {
        if let FieldValue::Number(number) = value
            && let Some(number) = serde_json::Number::from_f64(*number)
        {
            return Value::Number(number);
        }
        Value::String(value.to_string())
    }
}

/// Calendar dates. Reads the display text first, then a string or
/// `{"date": ...}` object raw value.
pub struct DateTransform;

impl ValueTransform for DateTransform {
    fn forward(&self, column: &Column) -> Result<Option<FieldValue>, TransformError> {
        let Some(raw) = date_input(column) else {
            return Ok(None);
        };
        parse_date(&raw).map(|date| Some(FieldValue::Date(date)))
    }
}

/// Checkbox or yes/no columns. A boolean raw value wins over text.
pub struct FlagTransform;

impl ValueTransform for FlagTransform {
    fn forward(&self, column: &Column) -> Result<Option<FieldValue>, TransformError> {
        match &column.value {
            Some(Value::Bool(flag)) => return Ok(Some(FieldValue::Flag(*flag))),
            Some(Value::Object(map)) => {
                if let Some(flag) = map.get("checked").and_then(json_flag) {
                    return Ok(Some(FieldValue::Flag(flag)));
                }
            }
            _ => {}
        }
        match column.text_trimmed() {
            Some(text) => parse_flag(text).map(|flag| Some(FieldValue::Flag(flag))),
            None => Ok(None),
        }
    }

    fn reverse(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::Flag(flag) => Value::Bool(*flag),
            other => Value::String(other.to_string()),
        }
    }
}

/// Comma-separated text, or an array raw value of strings.
pub struct ListTransform;

impl ValueTransform for ListTransform {
    fn forward(&self, column: &Column) -> Result<Option<FieldValue>, TransformError> {
        if let Some(Value::Array(items)) = &column.value {
            let items: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            return Ok(Some(FieldValue::List(items)));
        }
        Ok(column
            .text_trimmed()
            .map(|text| FieldValue::List(split_list(text))))
    }

    fn reverse(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Value::String(item.clone()))
                    .collect(),
            ),
            other => Value::String(other.to_string()),
        }
    }
}

impl TransformSpec {
    pub fn transformer(self) -> Arc<dyn ValueTransform> {
        match self {
            TransformSpec::Text => Arc::new(TextTransform),
            TransformSpec::Number => Arc::new(NumberTransform),
            TransformSpec::Date => Arc::new(DateTransform),
            TransformSpec::Flag => Arc::new(FlagTransform),
            TransformSpec::List => Arc::new(ListTransform),
        }
    }

    /// Converts an untyped override value (for example from a JSON
    /// overrides file) into the field's value type.
    pub fn coerce(self, value: &Value) -> Result<FieldValue, TransformError> {
        match (self, value) {
            (TransformSpec::Text, Value::String(text)) => {
                Ok(FieldValue::Text(text.trim().to_string()))
            }
            (TransformSpec::Text, Value::Number(number)) => {
                Ok(FieldValue::Text(number.to_string()))
            }
            (TransformSpec::Number, Value::Number(number)) => number
                .as_f64()
                .map(FieldValue::Number)
                .ok_or_else(|| TransformError::parse(format!("{} as a number", number))),
            (TransformSpec::Number, Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .map(FieldValue::Number)
                .map_err(|_| TransformError::parse(format!("{:?} as a number", text))),
            (TransformSpec::Date, Value::String(text)) => {
                parse_date(text.trim()).map(FieldValue::Date)
            }
            (TransformSpec::Flag, Value::Bool(flag)) => Ok(FieldValue::Flag(*flag)),
            (TransformSpec::Flag, Value::String(text)) => parse_flag(text).map(FieldValue::Flag),
            (TransformSpec::List, Value::Array(items)) => Ok(FieldValue::List(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect(),
            )),
            (TransformSpec::List, Value::String(text)) => Ok(FieldValue::List(split_list(text))),
            (spec, other) => Err(TransformError::parse(format!(
                "{} as {}",
                other,
                spec.as_str()
            ))),
        }
    }
}

/// Coerce an untyped override using the declared transform when present,
/// else by JSON shape. Null coerces to empty text, which unsets the field
/// when merged into a draft.
pub fn coerce_override(
    spec: Option<TransformSpec>,
    value: &Value,
) -> Result<FieldValue, TransformError> {
    if let Some(spec) = spec {
        return spec.coerce(value);
    }
    match value {
        Value::Null => Ok(FieldValue::Text(String::new())),
        Value::String(text) => Ok(FieldValue::Text(text.trim().to_string())),
        Value::Bool(flag) => Ok(FieldValue::Flag(*flag)),
        Value::Number(number) => number
            .as_f64()
            .map(FieldValue::Number)
            .ok_or_else(|| TransformError::parse(format!("{} as a number", number))),
        Value::Array(items) => Ok(FieldValue::List(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        )),
        Value::Object(_) => Err(TransformError::parse("a JSON object override".to_string())),
    }
}

/// Per-field transforms for one entity kind.
///
/// Fields without a registered transform fall back to the column's
/// trimmed display text.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    transforms: BTreeMap<FieldName, Arc<dyn ValueTransform>>,
}

impl TransformerRegistry {
    /// Wires the builtins a rule set declares.
    pub fn from_rules(rules: &MappingRules) -> Self {
        let mut registry = Self::default();
        for (field, spec) in &rules.transforms {
            registry.transforms.insert(field.clone(), spec.transformer());
        }
        registry
    }

    /// Installs a custom transform for a field, replacing any declared one.
    pub fn register(&mut self, field: FieldName, transform: Arc<dyn ValueTransform>) {
        self.transforms.insert(field, transform);
    }

    /// Converts one resolved column. `Ok(None)` means the column was blank
    /// or converted to an empty value, and the field stays unset.
    pub fn apply(
        &self,
        field: &FieldName,
        column: &Column,
    ) -> Result<Option<FieldValue>, TransformError> {
        match self.transforms.get(field) {
            Some(transform) => {
                let value = transform.forward(column)?;
                Ok(value.filter(|value| !value.is_empty()))
            }
            None => Ok(column
                .text_trimmed()
                .map(|text| FieldValue::Text(text.to_string()))),
        }
    }

    /// Renders a field value for sync-back: the registered transform's
    /// inverse, or the display form.
    pub fn reverse(&self, field: &FieldName, value: &FieldValue) -> Value {
        match self.transforms.get(field) {
            Some(transform) => transform.reverse(value),
            None => Value::String(value.to_string()),
        }
    }
}

impl fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("fields", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Tries the formats the source system is known to emit, most common
/// first.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TransformError> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    Err(TransformError::parse(format!("{:?} as a date", raw)))
}

/// The source system renders checked boxes as "v"; the rest are common
/// spellings.
pub fn parse_flag(raw: &str) -> Result<bool, TransformError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "v" | "checked" => Ok(true),
        "false" | "no" | "n" | "0" | "unchecked" => Ok(false),
        other => Err(TransformError::parse(format!("{:?} as a flag", other))),
    }
}

fn date_input(column: &Column) -> Option<String> {
    if let Some(text) = column.text_trimmed() {
        return Some(text.to_string());
    }
    let value = column.value.as_ref()?;
    let raw = match value {
        Value::String(raw) => raw.as_str(),
        Value::Object(map) => map.get("date").and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn json_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(raw) => parse_flag(raw).ok(),
        _ => None,
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
