//! Application Configuration
//!
//! Loaded from a JSON file or from environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_DB_PATH: &str = "recursive_todo.db";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_APP_NAME: &str = "RecursiveTodo";

/// Credentials sent to the hosted row store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteAuth {
    /// Server API key (admin scope)
    ApiKey(String),
    /// Session secret of the acting user
    Session(String),
}

/// Hosted row store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API root, e.g. `https://cloud.appwrite.io/v1`
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub table_id: String,
    pub auth: RemoteAuth,
}

/// Where todos are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    Sqlite { path: PathBuf },
    Remote(RemoteConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Sqlite {
                path: PathBuf::from(DEFAULT_DB_PATH),
            },
            log_dir: default_log_dir(),
            app_name: default_app_name(),
        }
    }
}

impl AppConfig {
    /// Build from process environment
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Build from a variable lookup.
    ///
    /// `APPWRITE_ENDPOINT` selects the remote backend, which then requires
    /// project, database, table and either an API key or a session secret.
    /// Otherwise SQLite at `TODO_DB_PATH` (or the default path) is used.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let require = |name: &str| lookup(name).ok_or_else(|| format!("Missing required env var: {}", name));

        let backend = match lookup("APPWRITE_ENDPOINT") {
            Some(endpoint) => {
                let auth = match (lookup("APPWRITE_API_KEY"), lookup("APPWRITE_SESSION")) {
                    (_, Some(session)) => RemoteAuth::Session(session),
                    (Some(key), None) => RemoteAuth::ApiKey(key),
                    (None, None) => return Err("Missing required env var: APPWRITE_API_KEY".to_string()),
                };
                BackendConfig::Remote(RemoteConfig {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    project_id: require("APPWRITE_PROJECT_ID")?,
                    database_id: require("APPWRITE_DATABASE_ID")?,
                    table_id: require("APPWRITE_TODOS_TABLE_ID")?,
                    auth,
                })
            }
            None => BackendConfig::Sqlite {
                path: lookup("TODO_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            },
        };

        Ok(Self {
            backend,
            log_dir: lookup("TODO_LOG_DIR").map(PathBuf::from).unwrap_or_else(default_log_dir),
            app_name: default_app_name(),
        })
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write config {}: {}", path.display(), e))
    }
}
