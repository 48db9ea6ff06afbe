use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::keys::TODO_PK_PREFIX;

/// Todo lifecycle status. Declaration order is the natural sort order.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    Open,
    InProgress,
    Completed,
}

/// Addresses one todo in both stores.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct TodoKey {
    pub pk: String,
    pub sk: String,
}

/// Raw projection row. Attribute fields are stored flat; the entity shape
/// nests them under `attributes`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TodoRecord {
    pub pk: String,
    pub sk: String,
    pub id: String,
    pub code: String,
    pub tenant_code: String,
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TodoStatus>,
    pub is_deleted: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sparse attribute values carried by payloads and commands. `None` means
/// the field is not part of the write.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TodoAttributeValues {
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TodoStatus>,
}

/// Attribute block exposed on the read-side entity. The due date is
/// rendered as an RFC 3339 string carrying the local offset.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TodoAttributes {
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<TodoStatus>,
}

/// Read-side todo entity returned by the service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Todo {
    pub pk: String,
    pub sk: String,
    pub id: String,
    pub code: String,
    pub tenant_code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub is_deleted: bool,
    pub version: i64,
    pub attributes: TodoAttributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TodoRecord> for Todo {
    fn from(row: TodoRecord) -> Self {
        Self {
            pk: row.pk,
            sk: row.sk,
            id: row.id,
            code: row.code,
            tenant_code: row.tenant_code,
            kind: TODO_PK_PREFIX.to_string(),
            name: row.name,
            is_deleted: row.is_deleted,
            version: row.version,
            attributes: TodoAttributes {
                description: row.description,
                due_date: row.due_date.map(|at| iso_string_with_timezone(&at)),
                status: row.status,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One page of todos plus the unpaged total for the same filter.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TodoList {
    pub total: u64,
    pub items: Vec<Todo>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CreateTodoPayload {
    pub name: String,
    #[serde(default)]
    pub attributes: TodoAttributeValues,
}

/// Partial update request; an absent field means "no change".
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UpdateTodoPayload {
    pub name: Option<String>,
    pub is_deleted: Option<bool>,
    pub attributes: Option<TodoAttributeValues>,
}

/// RFC 3339 rendering in the process-local offset, e.g.
/// `2024-05-01T18:30:00+09:00`.
pub fn iso_string_with_timezone(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}
