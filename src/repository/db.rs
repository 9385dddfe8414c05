//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared connection handle; `None` once closed
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    conn: SharedConnection,
}

impl DbState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Handle for repositories
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    /// Close the connection; later queries fail with "Database not initialized"
    pub async fn close(&self) {
        let mut guard = self.conn.lock().await;
        *guard = None;
    }
}

/// Open (or create) the database at `db_path` and run migrations.
/// `:memory:` opens a private in-memory database.
pub async fn init_db(db_path: &Path) -> Result<DbState, String> {
    let conn = Connection::open(db_path)
        .map_err(|e| format!("Failed to open db {}: {}", db_path.display(), e))?;

    run_migrations(&conn)?;
    log::info!("Database ready at {}", db_path.display());

    Ok(DbState::new(conn))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(names) = stmt.query_map((), |row| row.get::<_, String>(1)) else {
        return false;
    };
    let found = names.flatten().any(|name| name == column);
    found
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    // Parents must outlive their children: no ON DELETE CASCADE, deletes go
    // leaf-first from the caller.
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            parent_id TEXT REFERENCES todos(id),
            created_at INTEGER NOT NULL
        );",
    )
    .map_err(|e| e.to_string())?;

    if !column_exists(conn, "todos", "updated_at") {
        conn.execute("ALTER TABLE todos ADD COLUMN updated_at INTEGER", ())
            .map_err(|e| format!("Failed to add updated_at: {}", e))?;
    }

    // Create index for owner listings and parent-child lookups
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_todos_owner_parent ON todos(owner_id, parent_id)",
        (),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}
