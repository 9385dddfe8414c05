//! Todo Hierarchy Operations
//!
//! Tree view and cascading mutations on top of any `TodoRepository`.
//!
//! Cascades are best-effort: the flat list is fetched once, the affected ids
//! are resolved from that snapshot, then every id is attempted in order. A
//! failing id is logged and reported; it does not stop the remaining ids and
//! nothing is rolled back. A delete that fails also keeps every ancestor of
//! that id in place, so no stored row is left pointing at a deleted parent.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{build_tree, resolve_subtree_ids, DomainError, DomainResult, TodoNode};
use crate::repository::traits::TodoRepository;

/// A single id that could not be mutated during a cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeFailure {
    pub id: String,
    pub error: String,
}

/// Outcome of a cascade fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// True when every attempted mutation succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record<T>(&mut self, id: &str, result: DomainResult<T>) {
        self.attempted += 1;
        match result {
            Ok(_) => self.succeeded += 1,
            Err(e) => {
                log::warn!("Cascade step for todo {} failed: {}", id, e);
                self.failed.push(CascadeFailure {
                    id: id.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Trait for todo hierarchy operations
#[async_trait]
pub trait TodoHierarchyOperations {
    /// All todos of the owner as a forest, newest roots first
    async fn get_tree(&self, owner_id: &str) -> DomainResult<Vec<TodoNode>>;

    /// The todo and its transitive descendants, parents before children
    async fn get_subtree_ids(&self, owner_id: &str, id: &str) -> DomainResult<Vec<String>>;

    /// Completing cascades to every descendant; reopening only touches `id`
    async fn set_completed_cascade(
        &self,
        owner_id: &str,
        id: &str,
        completed: bool,
    ) -> DomainResult<CascadeReport>;

    /// Delete the todo and all descendants, children before parents
    async fn delete_cascade(&self, owner_id: &str, id: &str) -> DomainResult<CascadeReport>;
}

#[async_trait]
impl<R> TodoHierarchyOperations for R
where
    R: TodoRepository + ?Sized,
{
    async fn get_tree(&self, owner_id: &str) -> DomainResult<Vec<TodoNode>> {
        let todos = self.list_todos(owner_id).await?;
        Ok(build_tree(&todos))
    }

    async fn get_subtree_ids(&self, owner_id: &str, id: &str) -> DomainResult<Vec<String>> {
        let todos = self.list_todos(owner_id).await?;
        Ok(resolve_subtree_ids(&todos, id))
    }

    async fn set_completed_cascade(
        &self,
        owner_id: &str,
        id: &str,
        completed: bool,
    ) -> DomainResult<CascadeReport> {
        let mut report = CascadeReport::default();

        // Reopening a parent leaves its children as they are
        if !completed {
            let result = self.set_completed(owner_id, id, false).await;
            report.record(id, result);
            return Ok(report);
        }

        let ids = self.get_subtree_ids(owner_id, id).await?;
        log::debug!("Completing {} todos under {}", ids.len(), id);
        for target in &ids {
            let result = self.set_completed(owner_id, target, true).await;
            report.record(target, result);
        }
        Ok(report)
    }

    async fn delete_cascade(&self, owner_id: &str, id: &str) -> DomainResult<CascadeReport> {
        let mut report = CascadeReport::default();

        let todos = self.list_todos(owner_id).await?;
        let ids = resolve_subtree_ids(&todos, id);
        let parents: HashMap<&str, &str> = todos
            .iter()
            .filter_map(|t| t.parent_id.as_deref().map(|p| (t.id.as_str(), p)))
            .collect();
        log::debug!("Deleting {} todos under {}", ids.len(), id);

        // Ids whose child is still in storage; they must not be deleted
        let mut blocked: HashSet<&str> = HashSet::new();
        for target in ids.iter().rev() {
            let result = if blocked.contains(target.as_str()) {
                Err(DomainError::Conflict(format!("Todo {}: child not deleted", target)))
            } else {
                self.delete_todo(owner_id, target).await
            };

            if result.is_err() {
                if let Some(parent) = parents.get(target.as_str()) {
                    blocked.insert(*parent);
                }
            }
            report.record(target, result);
        }
        Ok(report)
    }
}
