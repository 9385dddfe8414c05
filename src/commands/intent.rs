//! Form Intents
//!
//! A single form endpoint carries an `_intent` field selecting the action.
//! Fields that make an action meaningless (blank title, blank id) turn it
//! into a no-op rather than an error.

use percent_encoding::percent_decode_str;

use super::todo_cmd::{create_todo, delete_todo, toggle_todo};
use crate::domain::TodoRecord;
use crate::repository::CascadeReport;
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoIntent {
    Create { title: String, parent_id: Option<String> },
    Toggle { id: String, completed: bool },
    Delete { id: String },
    Noop,
}

/// What a dispatched intent did
#[derive(Debug, Clone)]
pub enum IntentOutcome {
    Created(TodoRecord),
    Cascaded(CascadeReport),
    Skipped,
}

impl TodoIntent {
    /// Build an intent from decoded form fields. The first value of a
    /// repeated field wins.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut intent = None;
        let mut id = None;
        let mut parent_id = None;
        let mut completed = None;
        let mut title = None;

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "_intent" => &mut intent,
                "id" => &mut id,
                "parentId" => &mut parent_id,
                "completed" => &mut completed,
                "title" => &mut title,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.as_ref().to_string());
            }
        }

        let id = id.unwrap_or_default().trim().to_string();
        match intent.as_deref().unwrap_or("create") {
            "create" => {
                let title = title.unwrap_or_default().trim().to_string();
                if title.is_empty() {
                    return TodoIntent::Noop;
                }
                let parent_id = parent_id
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty());
                TodoIntent::Create { title, parent_id }
            }
            "toggle" if !id.is_empty() => TodoIntent::Toggle {
                id,
                completed: completed.as_deref() == Some("1"),
            },
            "delete" if !id.is_empty() => TodoIntent::Delete { id },
            _ => TodoIntent::Noop,
        }
    }

    /// Parse an `application/x-www-form-urlencoded` body
    pub fn from_urlencoded(body: &str) -> Self {
        let pairs = body
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (decode_component(key), decode_component(value))
            });
        Self::from_pairs(pairs)
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Run an intent against the owner's todos
pub async fn dispatch_intent(
    state: &AppState,
    owner_id: &str,
    intent: TodoIntent,
) -> Result<IntentOutcome, String> {
    match intent {
        TodoIntent::Create { title, parent_id } => {
            let todo = create_todo(state, owner_id, &title, parent_id.as_deref()).await?;
            Ok(IntentOutcome::Created(todo))
        }
        TodoIntent::Toggle { id, completed } => {
            let report = toggle_todo(state, owner_id, &id, completed).await?;
            Ok(IntentOutcome::Cascaded(report))
        }
        TodoIntent::Delete { id } => {
            let report = delete_todo(state, owner_id, &id).await?;
            Ok(IntentOutcome::Cascaded(report))
        }
        TodoIntent::Noop => {
            log::debug!("Ignoring empty form intent");
            Ok(IntentOutcome::Skipped)
        }
    }
}
