use serde::{Deserialize, Serialize};

/// One field of one external record, exactly as the source system returns
/// it: an opaque id, a free-text title, a declared type tag, display text,
/// and an optional raw value. Columns are immutable inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl Column {
    /// Trimmed display text, or None when blank.
    pub fn text_trimmed(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// A source-system record: its id, display name, and ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// One sync-back write; the external column is addressed by its title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWrite {
    pub title: String,
    pub value: serde_json::Value,
}
