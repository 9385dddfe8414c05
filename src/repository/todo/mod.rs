//! Todo Repository Module
//!
//! - todo_repo: SQLite CRUD operations
//! - todo_hierarchy: Tree view and cascades (works on any repository)

mod todo_hierarchy;
mod todo_repo;

pub use todo_hierarchy::{CascadeFailure, CascadeReport, TodoHierarchyOperations};
pub use todo_repo::SqliteTodoRepository;
