//! Row Conversion
//!
//! Rows come back from the hosted store as loosely typed JSON. They are
//! validated into `TodoRecord` here, before anything else sees them. Only a
//! missing `$id` or `userId` rejects a row; a row that can be addressed and
//! owned stays in the list so cascades still reach it.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{normalize_parent_id, DomainError, DomainResult, TodoRecord};

/// Shown for stored rows whose title is blank or not text
pub const UNTITLED: &str = "(untitled)";

/// A todo row as returned by the row store
#[derive(Debug, Clone, Deserialize)]
pub struct RawTodoRow {
    #[serde(rename = "$id")]
    pub id: Option<String>,
    #[serde(rename = "$createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub completed: Value,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Truthiness of a loosely typed flag
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

impl TryFrom<RawTodoRow> for TodoRecord {
    type Error = DomainError;

    fn try_from(row: RawTodoRow) -> DomainResult<Self> {
        let id = row
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| DomainError::InvalidInput("Row without $id".to_string()))?;
        let owner_id = row
            .user_id
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DomainError::InvalidInput(format!("Row {} has no userId", id)))?;
        let title = match row.title.as_str().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                log::warn!("Row {} has no usable title", id);
                UNTITLED.to_string()
            }
        };
        let created_at = row
            .created_at
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.timestamp_millis());

        Ok(TodoRecord {
            completed: coerce_bool(&row.completed),
            parent_id: normalize_parent_id(row.parent_id.as_deref()),
            id,
            title,
            owner_id,
            created_at,
        })
    }
}

/// Parse a JSON row into a validated record
pub fn parse_row(value: Value) -> DomainResult<TodoRecord> {
    let raw: RawTodoRow =
        serde_json::from_value(value).map_err(|e| DomainError::InvalidInput(format!("Malformed row: {}", e)))?;
    TodoRecord::try_from(raw)
}

/// Column data for a new row
pub fn new_row_data(owner_id: &str, title: &str, parent_id: Option<&str>) -> Value {
    json!({
        "userId": owner_id,
        "title": title,
        "completed": false,
        "parentId": parent_id,
    })
}
