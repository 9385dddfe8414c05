//! Commands Layer
//!
//! Command handlers that bridge the CLI and form submissions to the
//! repositories.

mod intent;
mod todo_cmd;

pub use intent::*;
pub use todo_cmd::*;
