//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for todo storage.
//! Implementations can use SQLite, a hosted row store, etc.

use async_trait::async_trait;

use crate::domain::{DomainResult, TodoRecord};

/// Owner-scoped todo storage.
///
/// Every operation only sees rows owned by `owner_id`; a row owned by someone
/// else behaves as if it did not exist.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos of the owner, newest first
    async fn list_todos(&self, owner_id: &str) -> DomainResult<Vec<TodoRecord>>;

    /// Find a todo by ID
    async fn find_todo(&self, owner_id: &str, id: &str) -> DomainResult<Option<TodoRecord>>;

    /// Create a todo, as a root or under `parent_id`
    async fn create_todo(
        &self,
        owner_id: &str,
        title: &str,
        parent_id: Option<&str>,
    ) -> DomainResult<TodoRecord>;

    /// Set the completion flag of a single todo
    async fn set_completed(&self, owner_id: &str, id: &str, completed: bool) -> DomainResult<TodoRecord>;

    /// Delete a single todo
    async fn delete_todo(&self, owner_id: &str, id: &str) -> DomainResult<()>;
}
