//! Single-process implementation of all three collaborator traits, used by
//! the integration suite and as a local-dev backend. Commands apply
//! synchronously, so the projection never lags here; real deployments may.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use todo_atoms::todo::{
    PageWindow, SortDirection, SortKey, TodoCommand, TodoFilter, TodoKey, TodoPartialCommand,
    TodoRecord,
};

use crate::error::TodoError;
use crate::stores::{CommandStore, ProjectionStore, TaskNotifier, TaskRequest};

/// Entry in the append-only command log.
#[derive(Debug, Clone)]
pub enum LoggedCommand {
    Create(TodoCommand),
    Partial(TodoPartialCommand),
}

#[derive(Default)]
struct Inner {
    rows: HashMap<(String, String), TodoRecord>,
    log: Vec<LoggedCommand>,
    tasks: Vec<TaskRequest>,
}

/// In-memory command log + projection + task inbox.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands accepted so far, in apply order.
    pub fn command_log(&self) -> Vec<LoggedCommand> {
        self.inner.lock().expect("memory store poisoned").log.clone()
    }

    /// Task requests recorded by the notifier half.
    pub fn tasks(&self) -> Vec<TaskRequest> {
        self.inner
            .lock()
            .expect("memory store poisoned")
            .tasks
            .clone()
    }
}

#[async_trait]
impl CommandStore for MemoryStore {
    async fn publish(&self, command: TodoCommand) -> Result<TodoRecord, TodoError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let key = (command.pk.clone(), command.sk.clone());

        // A create command must open a fresh (pk, sk) history.
        if let Some(current) = inner.rows.get(&key) {
            return Err(TodoError::Conflict {
                id: current.id.clone(),
                target: command.version,
                current: current.version,
            });
        }

        let now = Utc::now();
        let row = TodoRecord {
            pk: command.pk.clone(),
            sk: command.sk.clone(),
            id: command.id.clone(),
            code: command.code.clone(),
            tenant_code: command.tenant_code.clone(),
            name: command.name.clone(),
            description: command.attributes.description.clone(),
            due_date: command.attributes.due_date,
            status: command.attributes.status,
            is_deleted: command.is_deleted,
            version: command.version,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(key, row.clone());
        inner.log.push(LoggedCommand::Create(command));
        Ok(row)
    }

    async fn publish_partial_update(
        &self,
        command: TodoPartialCommand,
    ) -> Result<TodoRecord, TodoError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let key = (command.pk.clone(), command.sk.clone());
        let row = inner.rows.get_mut(&key).ok_or(TodoError::NotFound)?;

        if row.version != command.version {
            return Err(TodoError::Conflict {
                id: row.id.clone(),
                target: command.version,
                current: row.version,
            });
        }

        if let Some(name) = &command.name {
            row.name = name.clone();
        }
        if let Some(is_deleted) = command.is_deleted {
            row.is_deleted = is_deleted;
        }
        if let Some(attributes) = &command.attributes {
            row.description = attributes.description.clone();
            row.due_date = attributes.due_date;
            row.status = attributes.status;
        }
        row.version += 1;
        row.updated_at = Utc::now();

        let row = row.clone();
        inner.log.push(LoggedCommand::Partial(command));
        Ok(row)
    }
}

#[async_trait]
impl ProjectionStore for MemoryStore {
    async fn get_item(&self, key: &TodoKey) -> Result<Option<TodoRecord>, TodoError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.rows.get(&(key.pk.clone(), key.sk.clone())).cloned())
    }

    async fn count(&self, filter: &TodoFilter) -> Result<u64, TodoError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .rows
            .values()
            .filter(|row| matches_filter(row, filter))
            .count() as u64)
    }

    async fn find_many(
        &self,
        filter: &TodoFilter,
        page: PageWindow,
        order_by: &[SortKey],
    ) -> Result<Vec<TodoRecord>, TodoError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut rows: Vec<TodoRecord> = inner
            .rows
            .values()
            .filter(|row| matches_filter(row, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, order_by));
        Ok(rows
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }
}

#[async_trait]
impl TaskNotifier for MemoryStore {
    async fn create_task(&self, request: TaskRequest) -> Result<(), TodoError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.tasks.push(request);
        Ok(())
    }
}

fn matches_filter(row: &TodoRecord, filter: &TodoFilter) -> bool {
    if row.tenant_code != filter.tenant_code || row.is_deleted != filter.is_deleted {
        return false;
    }
    if let Some(keyword) = &filter.keyword {
        let keyword = keyword.to_lowercase();
        let in_name = row.name.to_lowercase().contains(&keyword);
        let in_description = row
            .description
            .as_deref()
            .map(|description| description.to_lowercase().contains(&keyword))
            .unwrap_or(false);
        if !in_name && !in_description {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if row.status != Some(status) {
            return false;
        }
    }
    if let Some(range) = &filter.due_date {
        let Some(due) = row.due_date else {
            return false;
        };
        if range.gte.is_some_and(|gte| due < gte) {
            return false;
        }
        if range.lte.is_some_and(|lte| due > lte) {
            return false;
        }
    }
    true
}

fn compare_rows(a: &TodoRecord, b: &TodoRecord, order_by: &[SortKey]) -> Ordering {
    for key in order_by {
        let ordering = match key.direction {
            SortDirection::Asc => compare_field(a, b, &key.field),
            SortDirection::Desc => compare_field(a, b, &key.field).reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// Unknown fields compare equal and fall through to the next sort key.
fn compare_field(a: &TodoRecord, b: &TodoRecord, field: &str) -> Ordering {
    match field {
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        "name" => a.name.cmp(&b.name),
        "code" => a.code.cmp(&b.code),
        "due_date" => a.due_date.cmp(&b.due_date),
        "status" => a.status.cmp(&b.status),
        "version" => a.version.cmp(&b.version),
        _ => Ordering::Equal,
    }
}
