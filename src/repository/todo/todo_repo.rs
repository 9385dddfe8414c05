//! Todo Repository - SQLite
//!
//! SQLite-backed implementation of `TodoRepository`. Every statement carries
//! the owner in its WHERE clause.

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::domain::{DomainError, DomainResult, TodoRecord};
use crate::repository::db::SharedConnection;
use crate::repository::traits::TodoRepository;

const SELECT_COLUMNS: &str = "SELECT id, title, completed, parent_id, owner_id, created_at FROM todos";

/// SQLite implementation of the todo repository
pub struct SqliteTodoRepository {
    conn: SharedConnection,
}

impl SqliteTodoRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

fn select_one(conn: &Connection, owner_id: &str, id: &str) -> DomainResult<Option<TodoRecord>> {
    conn.query_row(
        &format!("{} WHERE id = ? AND owner_id = ?", SELECT_COLUMNS),
        params![id, owner_id],
        row_to_todo,
    )
    .optional()
    .map_err(|e| DomainError::Internal(e.to_string()))
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation)
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn list_todos(&self, owner_id: &str) -> DomainResult<Vec<TodoRecord>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn
            .prepare(&format!(
                "{} WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC",
                SELECT_COLUMNS
            ))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let todos = stmt
            .query_map(params![owner_id], row_to_todo)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(todos)
    }

    async fn find_todo(&self, owner_id: &str, id: &str) -> DomainResult<Option<TodoRecord>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        select_one(conn, owner_id, id)
    }

    async fn create_todo(
        &self,
        owner_id: &str,
        title: &str,
        parent_id: Option<&str>,
    ) -> DomainResult<TodoRecord> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        if let Some(pid) = parent_id {
            if select_one(conn, owner_id, pid)?.is_none() {
                return Err(DomainError::NotFound(format!("Parent todo {} not found", pid)));
            }
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO todos (id, owner_id, title, completed, parent_id, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?, ?)",
            params![id, owner_id, title, parent_id, now, now],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(TodoRecord {
            id,
            title: title.to_string(),
            completed: false,
            parent_id: parent_id.map(str::to_string),
            owner_id: owner_id.to_string(),
            created_at: Some(now),
        })
    }

    async fn set_completed(&self, owner_id: &str, id: &str, completed: bool) -> DomainResult<TodoRecord> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn
            .execute(
                "UPDATE todos SET completed = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
                params![completed, chrono::Utc::now().timestamp_millis(), id, owner_id],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Todo {} not found", id)));
        }

        select_one(conn, owner_id, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Todo {} not found", id)))
    }

    async fn delete_todo(&self, owner_id: &str, id: &str) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let deleted = conn
            .execute(
                "DELETE FROM todos WHERE id = ? AND owner_id = ?",
                params![id, owner_id],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    DomainError::Conflict(format!("Todo {} still has children", id))
                } else {
                    DomainError::Internal(e.to_string())
                }
            })?;
        if deleted == 0 {
            return Err(DomainError::NotFound(format!("Todo {} not found", id)));
        }
        Ok(())
    }
}

/// Convert a database row to TodoRecord
fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<TodoRecord> {
    Ok(TodoRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get::<_, i64>(2)? != 0,
        parent_id: row.get::<_, Option<String>>(3)?.filter(|p| !p.is_empty()),
        owner_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}
