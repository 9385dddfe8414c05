//! Todo Entity
//!
//! Represents a todo with hierarchical structure (single parent).

use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};

/// A todo as stored by a repository, scoped to one owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    /// Opaque identifier assigned by storage
    pub id: String,
    /// Display text, never empty
    pub title: String,
    /// Completion status
    pub completed: bool,
    /// Parent todo ID (None = root level)
    pub parent_id: Option<String>,
    /// Owning user
    pub owner_id: String,
    /// Creation time in epoch milliseconds
    pub created_at: Option<i64>,
}

impl TodoRecord {
    /// Create a new root todo
    pub fn new(id: impl Into<String>, title: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            parent_id: None,
            owner_id: owner_id.into(),
            created_at: None,
        }
    }

    /// Create a new todo under a parent
    pub fn new_child(
        id: impl Into<String>,
        title: impl Into<String>,
        owner_id: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::new(id, title, owner_id)
        }
    }

    /// Check if this is a root todo (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Trim a title and reject it when nothing is left
pub fn validate_title(raw: &str) -> DomainResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::InvalidInput("Title is required".to_string()));
    }
    Ok(title.to_string())
}

/// Normalize an optional parent reference: blank means root
pub fn normalize_parent_id(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// A todo with its children attached, built per request for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoNode {
    #[serde(flatten)]
    pub record: TodoRecord,
    pub children: Vec<TodoNode>,
}

impl TodoNode {
    pub fn new(record: TodoRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}
