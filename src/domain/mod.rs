//! Domain Layer
//!
//! Todo entities, validation and the tree/subtree derivation.
//! This layer does no I/O and has no external dependencies besides serde.

mod error;
mod todo;
mod todo_tree;

pub use error::{DomainError, DomainResult};
pub use todo::{normalize_parent_id, validate_title, TodoNode, TodoRecord};
pub use todo_tree::{build_tree, flatten_tree, resolve_subtree_ids};
