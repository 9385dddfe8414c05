//! Remote Todo Repository
//!
//! Todo storage in a hosted row store reached over its REST API.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::query;
use super::row::{new_row_data, parse_row};
use crate::config::{RemoteAuth, RemoteConfig};
use crate::domain::{DomainError, DomainResult, TodoRecord};
use crate::repository::traits::TodoRepository;

/// Rows fetched per list request
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct RowList {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    rows: Vec<Value>,
}

/// REST implementation of the todo repository
#[derive(Clone)]
pub struct RemoteTodoRepository {
    client: Client,
    config: RemoteConfig,
}

impl RemoteTodoRepository {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn rows_url(&self) -> String {
        format!(
            "{}/tablesdb/{}/tables/{}/rows",
            self.config.endpoint.trim_end_matches('/'),
            utf8_percent_encode(&self.config.database_id, NON_ALPHANUMERIC),
            utf8_percent_encode(&self.config.table_id, NON_ALPHANUMERIC),
        )
    }

    fn row_url(&self, id: &str) -> String {
        format!("{}/{}", self.rows_url(), utf8_percent_encode(id, NON_ALPHANUMERIC))
    }

    /// Request with project and credential headers attached
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("Content-Type", "application/json");
        match &self.config.auth {
            RemoteAuth::ApiKey(key) => builder.header("X-Appwrite-Key", key),
            RemoteAuth::Session(secret) => builder.header("X-Appwrite-Session", secret),
        }
    }

    fn list_request(&self, owner_id: &str, offset: usize) -> RequestBuilder {
        let queries = [
            query::equal("userId", owner_id),
            query::order_desc("$createdAt"),
            query::limit(PAGE_SIZE),
            query::offset(offset),
        ];
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        self.request(Method::GET, &self.rows_url()).query(&params)
    }

    /// Fetch a row and keep it only if it belongs to the owner
    async fn fetch_owned(&self, owner_id: &str, id: &str) -> DomainResult<Option<TodoRecord>> {
        let resp = self
            .request(Method::GET, &self.row_url(id))
            .send()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value: Value = ensure_success(resp, &format!("Todo {}", id))
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let todo = parse_row(value)?;
        Ok(Some(todo).filter(|t| t.owner_id == owner_id))
    }

    async fn require_owned(&self, owner_id: &str, id: &str) -> DomainResult<TodoRecord> {
        self.fetch_owned(owner_id, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Todo {} not found", id)))
    }
}

/// Map an unsuccessful response status to a domain error
fn status_error(status: StatusCode, context: &str, body: &str) -> DomainError {
    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(format!("{} not found", context)),
        StatusCode::CONFLICT => DomainError::Conflict(format!("{}: {}", context, body)),
        StatusCode::BAD_REQUEST => DomainError::InvalidInput(format!("{}: {}", context, body)),
        _ => DomainError::Internal(format!("{}: {} - {}", context, status, body)),
    }
}

async fn ensure_success(resp: Response, context: &str) -> DomainResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_error(status, context, &body))
}

#[async_trait]
impl TodoRepository for RemoteTodoRepository {
    async fn list_todos(&self, owner_id: &str) -> DomainResult<Vec<TodoRecord>> {
        let mut todos = Vec::new();
        let mut offset = 0;

        loop {
            let resp = self
                .list_request(owner_id, offset)
                .send()
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            let page: RowList = ensure_success(resp, "Todo list")
                .await?
                .json()
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?;

            let count = page.rows.len();
            for value in page.rows {
                match parse_row(value) {
                    Ok(todo) if todo.owner_id == owner_id => todos.push(todo),
                    Ok(todo) => log::warn!("Skipping todo {} owned by another user", todo.id),
                    Err(e) => log::warn!("Skipping invalid todo row: {}", e),
                }
            }

            offset += count;
            if count < PAGE_SIZE || offset >= page.total {
                break;
            }
        }

        log::debug!("Fetched {} todos for {}", todos.len(), owner_id);
        Ok(todos)
    }

    async fn find_todo(&self, owner_id: &str, id: &str) -> DomainResult<Option<TodoRecord>> {
        self.fetch_owned(owner_id, id).await
    }

    async fn create_todo(
        &self,
        owner_id: &str,
        title: &str,
        parent_id: Option<&str>,
    ) -> DomainResult<TodoRecord> {
        if let Some(pid) = parent_id {
            if self.fetch_owned(owner_id, pid).await?.is_none() {
                return Err(DomainError::NotFound(format!("Parent todo {} not found", pid)));
            }
        }

        let body = json!({
            "rowId": uuid::Uuid::new_v4().simple().to_string(),
            "data": new_row_data(owner_id, title, parent_id),
            "permissions": query::user_permissions(owner_id),
        });
        let resp = self
            .request(Method::POST, &self.rows_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let value: Value = ensure_success(resp, "Create todo")
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        parse_row(value)
    }

    async fn set_completed(&self, owner_id: &str, id: &str, completed: bool) -> DomainResult<TodoRecord> {
        self.require_owned(owner_id, id).await?;

        let resp = self
            .request(Method::PATCH, &self.row_url(id))
            .json(&json!({ "data": { "completed": completed } }))
            .send()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let value: Value = ensure_success(resp, &format!("Todo {}", id))
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        parse_row(value)
    }

    async fn delete_todo(&self, owner_id: &str, id: &str) -> DomainResult<()> {
        self.require_owned(owner_id, id).await?;

        let resp = self
            .request(Method::DELETE, &self.row_url(id))
            .send()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        ensure_success(resp, &format!("Todo {}", id)).await?;
        Ok(())
    }
}
