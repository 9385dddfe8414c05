//! Todo Commands
//!
//! Entry points used by the CLI and the form-intent dispatcher. Errors are
//! flattened to strings at this boundary.

use crate::domain::{normalize_parent_id, validate_title, TodoNode, TodoRecord};
use crate::repository::{CascadeReport, TodoHierarchyOperations};
use crate::AppState;

/// All todos of the owner as a tree, newest roots first
pub async fn list_todo_tree(state: &AppState, owner_id: &str) -> Result<Vec<TodoNode>, String> {
    state.repo.get_tree(owner_id).await.map_err(|e| e.to_string())
}

/// Create a todo, as a root or under an existing parent
pub async fn create_todo(
    state: &AppState,
    owner_id: &str,
    title: &str,
    parent_id: Option<&str>,
) -> Result<TodoRecord, String> {
    let title = validate_title(title).map_err(|e| e.to_string())?;
    let parent_id = normalize_parent_id(parent_id);

    let todo = state
        .repo
        .create_todo(owner_id, &title, parent_id.as_deref())
        .await
        .map_err(|e| e.to_string())?;

    log::info!("Created todo {} (parent: {:?})", todo.id, todo.parent_id);
    Ok(todo)
}

/// Set completion; completing also completes every descendant
pub async fn toggle_todo(
    state: &AppState,
    owner_id: &str,
    id: &str,
    completed: bool,
) -> Result<CascadeReport, String> {
    let report = state
        .repo
        .set_completed_cascade(owner_id, id, completed)
        .await
        .map_err(|e| e.to_string())?;

    log_report("Toggled", id, &report);
    Ok(report)
}

/// Delete a todo together with all of its descendants
pub async fn delete_todo(state: &AppState, owner_id: &str, id: &str) -> Result<CascadeReport, String> {
    let report = state
        .repo
        .delete_cascade(owner_id, id)
        .await
        .map_err(|e| e.to_string())?;

    log_report("Deleted", id, &report);
    Ok(report)
}

fn log_report(action: &str, id: &str, report: &CascadeReport) {
    if report.is_complete() {
        log::info!("{} todo {}: {} row(s)", action, id, report.succeeded);
    } else {
        log::error!(
            "{} todo {} partially: {}/{} row(s), {} failed",
            action,
            id,
            report.succeeded,
            report.attempted,
            report.failed.len()
        );
    }
}
