//! Remote Repository Module
//!
//! - remote_repo: REST client implementing `TodoRepository`
//! - row: JSON row validation
//! - query: query and permission encoding

mod query;
mod remote_repo;
mod row;

pub use remote_repo::RemoteTodoRepository;
pub use row::{parse_row, RawTodoRow};
