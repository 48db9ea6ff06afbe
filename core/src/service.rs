use std::sync::Arc;

use todo_atoms::tenant;
use todo_atoms::todo::{
    self, CreateTodoPayload, Todo, TodoKey, TodoList, TodoSearchPayload, TodoStatus,
    UpdateTodoPayload,
};

use crate::error::TodoError;
use crate::stores::{
    ActorContext, CommandStore, ProjectionStore, TaskNotifier, TaskRequest, TODO_TASK_TYPE,
};

/// Domain event produced by an applied write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoEvent {
    /// The write left the todo in COMPLETED status.
    Completed,
}

/// Post-commit hook deciding which events reach the task subsystem.
/// Failures are logged and swallowed: the write has already committed and
/// is not rolled back.
struct TodoEventDispatcher {
    tasks: Arc<dyn TaskNotifier>,
}

impl TodoEventDispatcher {
    async fn dispatch(&self, event: TodoEvent, updated: &Todo) {
        match event {
            TodoEvent::Completed => {
                let input = match serde_json::to_value(updated) {
                    Ok(input) => input,
                    Err(e) => {
                        tracing::warn!("Failed to encode completed todo {}: {}", updated.id, e);
                        return;
                    }
                };
                let request = TaskRequest {
                    tenant_code: updated.tenant_code.clone(),
                    task_type: TODO_TASK_TYPE.to_string(),
                    input,
                };
                if let Err(e) = self.tasks.create_task(request).await {
                    tracing::warn!("Failed to create task for completed todo {}: {}", updated.id, e);
                }
            }
        }
    }
}

/// Orchestrates todo reads and writes over the injected collaborators.
pub struct TodoService {
    commands: Arc<dyn CommandStore>,
    projections: Arc<dyn ProjectionStore>,
    events: TodoEventDispatcher,
}

impl TodoService {
    pub fn new(
        commands: Arc<dyn CommandStore>,
        projections: Arc<dyn ProjectionStore>,
        tasks: Arc<dyn TaskNotifier>,
    ) -> Self {
        Self {
            commands,
            projections,
            events: TodoEventDispatcher { tasks },
        }
    }

    /// Creates a todo owned by the acting tenant, starting its version
    /// history at the first version.
    pub async fn create(
        &self,
        payload: CreateTodoPayload,
        ctx: &ActorContext,
    ) -> Result<Todo, TodoError> {
        let command = todo::build_create_command(payload, &ctx.tenant_code);
        let row = self.commands.publish(command).await?;
        Ok(Todo::from(row))
    }

    /// Fetches one todo by key. No tenant check here: the key alone does
    /// not prove ownership and this path never mutates.
    pub async fn find_one(&self, key: &TodoKey) -> Result<Todo, TodoError> {
        let row = self
            .projections
            .get_item(key)
            .await?
            .ok_or(TodoError::NotFound)?;
        tracing::debug!("item: {:?}", row);
        Ok(Todo::from(row))
    }

    /// Lists a tenant's todos. The count and page queries run concurrently
    /// against the projection and share the same filter.
    pub async fn find_all(
        &self,
        tenant_code: &str,
        search: TodoSearchPayload,
    ) -> Result<TodoList, TodoError> {
        let query = todo::compose_list_query(tenant_code, &search);

        let (total, items) = tokio::join!(
            self.projections.count(&query.filter),
            self.projections
                .find_many(&query.filter, query.page, &query.order_by),
        );

        Ok(TodoList {
            total: total?,
            items: items?.into_iter().map(Todo::from).collect(),
        })
    }

    /// Applies a partial update on top of the row's current version, then
    /// dispatches whichever domain event the write produced.
    pub async fn update(
        &self,
        key: &TodoKey,
        payload: UpdateTodoPayload,
        ctx: &ActorContext,
    ) -> Result<Todo, TodoError> {
        let (updated, event) = self.apply_update(key, payload, ctx).await?;
        if let Some(event) = event {
            self.events.dispatch(event, &updated).await;
        }
        Ok(updated)
    }

    /// Soft delete: publishes `is_deleted = true` at the current version.
    /// The row stays readable by key afterwards.
    pub async fn remove(&self, key: &TodoKey, ctx: &ActorContext) -> Result<Todo, TodoError> {
        self.authorize(key, ctx)?;
        let existing = self
            .projections
            .get_item(key)
            .await?
            .ok_or(TodoError::NotFound)?;
        let command = todo::build_delete_command(&existing);
        let row = self.commands.publish_partial_update(command).await?;
        Ok(Todo::from(row))
    }

    /// Publishes the merged update command and reports which domain event,
    /// if any, the write produced. The completion event fires whenever the
    /// merged status is COMPLETED, with no transition-edge check, so a
    /// second COMPLETED write fires it again.
    async fn apply_update(
        &self,
        key: &TodoKey,
        payload: UpdateTodoPayload,
        ctx: &ActorContext,
    ) -> Result<(Todo, Option<TodoEvent>), TodoError> {
        self.authorize(key, ctx)?;
        let existing = self
            .projections
            .get_item(key)
            .await?
            .ok_or(TodoError::NotFound)?;

        let command = todo::build_update_command(&existing, &payload);
        let completed = command
            .attributes
            .as_ref()
            .and_then(|attributes| attributes.status)
            == Some(TodoStatus::Completed);

        let row = self.commands.publish_partial_update(command).await?;
        let event = completed.then_some(TodoEvent::Completed);
        Ok((Todo::from(row), event))
    }

    /// Mutation guard: the tenant embedded in the key must match the actor.
    fn authorize(&self, key: &TodoKey, ctx: &ActorContext) -> Result<(), TodoError> {
        let resource_tenant = todo::parse_pk(&key.pk)?;
        tenant::ensure_tenant(&ctx.tenant_code, resource_tenant)?;
        Ok(())
    }
}
