use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use todo_atoms::todo::{
    PageWindow, SortKey, TodoCommand, TodoFilter, TodoKey, TodoPartialCommand, TodoRecord,
};

use crate::error::TodoError;

/// Per-request actor identity. Only the tenant code matters to this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    pub tenant_code: String,
}

impl ActorContext {
    pub fn new(tenant_code: impl Into<String>) -> Self {
        Self {
            tenant_code: tenant_code.into(),
        }
    }
}

/// Task type attached to todo completion tasks.
pub const TODO_TASK_TYPE: &str = "todo";

/// Trigger payload handed to the downstream task subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRequest {
    pub tenant_code: String,
    pub task_type: String,
    pub input: serde_json::Value,
}

/// Append-only write side. Implementations apply a command only when its
/// target version matches the current row version, and must surface a
/// mismatch as [`TodoError::Conflict`].
#[async_trait]
pub trait CommandStore: Send + Sync {
    /// Applies a create command and returns the resulting projection row.
    async fn publish(&self, command: TodoCommand) -> Result<TodoRecord, TodoError>;

    /// Applies a partial command on top of the targeted version.
    async fn publish_partial_update(
        &self,
        command: TodoPartialCommand,
    ) -> Result<TodoRecord, TodoError>;
}

/// Read-only query surface over the derived projection. May lag the
/// command store; a read is not guaranteed to observe the latest write.
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    async fn get_item(&self, key: &TodoKey) -> Result<Option<TodoRecord>, TodoError>;

    async fn count(&self, filter: &TodoFilter) -> Result<u64, TodoError>;

    async fn find_many(
        &self,
        filter: &TodoFilter,
        page: PageWindow,
        order_by: &[SortKey],
    ) -> Result<Vec<TodoRecord>, TodoError>;
}

/// Fire-and-forget trigger for the downstream task subsystem.
#[async_trait]
pub trait TaskNotifier: Send + Sync {
    async fn create_task(&self, request: TaskRequest) -> Result<(), TodoError>;
}
