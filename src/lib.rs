//! Recursive Todo Backend
//!
//! Layered architecture:
//! - domain: Todo entities and the tree/subtree derivation
//! - repository: Storage abstraction with SQLite and hosted row store backends
//! - commands: Command handlers and form intents
//! - config: Backend selection and logging settings

use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod domain;
pub mod repository;

use config::{AppConfig, BackendConfig};
use repository::{init_db, DbState, RemoteTodoRepository, SqliteTodoRepository, TodoRepository};

/// Application state shared across commands
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TodoRepository>,
    /// Set when the local SQLite backend is in use
    pub db_state: Option<DbState>,
}

impl AppState {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo, db_state: None }
    }

    /// Open the backend named by the configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, String> {
        match &config.backend {
            BackendConfig::Sqlite { path } => {
                let db_state = init_db(path).await?;
                let repo = SqliteTodoRepository::new(db_state.connection());
                Ok(Self {
                    repo: Arc::new(repo),
                    db_state: Some(db_state),
                })
            }
            BackendConfig::Remote(remote) => {
                log::info!("Using remote row store at {}", remote.endpoint);
                Ok(Self::new(Arc::new(RemoteTodoRepository::new(remote.clone()))))
            }
        }
    }

    /// Release the local database, if any
    pub async fn shutdown(&self) {
        if let Some(db_state) = &self.db_state {
            db_state.close().await;
        }
    }

    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self, String> {
        let config = AppConfig {
            backend: BackendConfig::Sqlite {
                path: std::path::PathBuf::from(":memory:"),
            },
            ..AppConfig::default()
        };
        Self::from_config(&config).await
    }
}
