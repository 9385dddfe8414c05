//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod remote;
mod todo;
mod traits;

#[cfg(test)]
mod tests;

pub use db::{init_db, DbState, SharedConnection};
pub use remote::{parse_row, RawTodoRow, RemoteTodoRepository};
pub use todo::{CascadeFailure, CascadeReport, SqliteTodoRepository, TodoHierarchyOperations};
pub use traits::TodoRepository;
