use serde::{Deserialize, Serialize};

use super::keys;
use super::model::{CreateTodoPayload, TodoAttributeValues, TodoRecord, UpdateTodoPayload};

/// Version assigned to the first command of a todo. Every applied command
/// moves the projection row forward by exactly one version.
pub const FIRST_VERSION: i64 = 1;

/// Full create command; establishes a new (pk, sk) history.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TodoCommand {
    pub pk: String,
    pub sk: String,
    pub id: String,
    pub code: String,
    pub tenant_code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: i64,
    pub name: String,
    pub is_deleted: bool,
    pub attributes: TodoAttributeValues,
}

/// Partial command. `version` is the optimistic concurrency target; fields
/// left `None` keep their current value when the store applies it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TodoPartialCommand {
    pub pk: String,
    pub sk: String,
    pub version: i64,
    pub name: Option<String>,
    pub is_deleted: Option<bool>,
    pub attributes: Option<TodoAttributeValues>,
}

/// Assembles the create command for a new todo owned by `tenant_code`.
/// The sort key doubles as the todo's code.
pub fn build_create_command(payload: CreateTodoPayload, tenant_code: &str) -> TodoCommand {
    let pk = keys::todo_pk(tenant_code);
    let sk = keys::todo_sk();
    TodoCommand {
        id: keys::todo_id(&pk, &sk),
        code: sk.clone(),
        tenant_code: tenant_code.to_string(),
        kind: keys::TODO_PK_PREFIX.to_string(),
        version: FIRST_VERSION,
        name: payload.name,
        is_deleted: false,
        attributes: payload.attributes,
        pk,
        sk,
    }
}

/// Partial update targeting the row's current version. Name and the delete
/// flag fall back to the row when the patch omits them; attributes merge
/// shallowly, patch fields winning over row fields.
pub fn build_update_command(existing: &TodoRecord, patch: &UpdateTodoPayload) -> TodoPartialCommand {
    TodoPartialCommand {
        pk: existing.pk.clone(),
        sk: existing.sk.clone(),
        version: existing.version,
        name: Some(
            patch
                .name
                .clone()
                .unwrap_or_else(|| existing.name.clone()),
        ),
        is_deleted: Some(patch.is_deleted.unwrap_or(existing.is_deleted)),
        attributes: Some(merge_attributes(existing, patch.attributes.as_ref())),
    }
}

/// Marks the row deleted at its current version; nothing else changes.
pub fn build_delete_command(existing: &TodoRecord) -> TodoPartialCommand {
    TodoPartialCommand {
        pk: existing.pk.clone(),
        sk: existing.sk.clone(),
        version: existing.version,
        name: None,
        is_deleted: Some(true),
        attributes: None,
    }
}

fn merge_attributes(
    existing: &TodoRecord,
    patch: Option<&TodoAttributeValues>,
) -> TodoAttributeValues {
    let patch = patch.cloned().unwrap_or_default();
    TodoAttributeValues {
        description: patch.description.or_else(|| existing.description.clone()),
        due_date: patch.due_date.or(existing.due_date),
        status: patch.status.or(existing.status),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::super::model::TodoStatus;
    use super::*;

    fn existing() -> TodoRecord {
        TodoRecord {
            pk: "TODO#acme".to_string(),
            sk: "abc".to_string(),
            id: "TODO#acme#abc".to_string(),
            code: "abc".to_string(),
            tenant_code: "acme".to_string(),
            name: "buy milk".to_string(),
            description: Some("a".to_string()),
            due_date: None,
            status: Some(TodoStatus::Open),
            is_deleted: false,
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_command_derives_keys_and_first_version() {
        let command = build_create_command(
            CreateTodoPayload {
                name: "buy milk".to_string(),
                attributes: TodoAttributeValues::default(),
            },
            "acme",
        );

        assert_eq!(command.pk, "TODO#acme");
        assert_eq!(command.code, command.sk);
        assert_eq!(command.id, format!("{}#{}", command.pk, command.sk));
        assert_eq!(command.kind, "TODO");
        assert_eq!(command.version, FIRST_VERSION);
        assert_eq!(command.name, "buy milk");
        assert!(!command.is_deleted);
    }

    #[test]
    fn update_merge_keeps_unspecified_attributes() {
        let patch = UpdateTodoPayload {
            attributes: Some(TodoAttributeValues {
                status: Some(TodoStatus::Completed),
                ..Default::default()
            }),
            ..Default::default()
        };

        let command = build_update_command(&existing(), &patch);
        let attributes = command.attributes.unwrap();

        assert_eq!(attributes.description.as_deref(), Some("a"));
        assert_eq!(attributes.status, Some(TodoStatus::Completed));
        assert_eq!(command.version, 3);
    }

    #[test]
    fn update_falls_back_to_existing_name_and_delete_flag() {
        let command = build_update_command(&existing(), &UpdateTodoPayload::default());
        assert_eq!(command.name.as_deref(), Some("buy milk"));
        assert_eq!(command.is_deleted, Some(false));
    }

    #[test]
    fn update_overrides_name_when_patched() {
        let patch = UpdateTodoPayload {
            name: Some("buy oat milk".to_string()),
            ..Default::default()
        };
        let command = build_update_command(&existing(), &patch);
        assert_eq!(command.name.as_deref(), Some("buy oat milk"));
    }

    #[test]
    fn delete_command_only_sets_the_flag() {
        let command = build_delete_command(&existing());
        assert_eq!(command.version, 3);
        assert_eq!(command.is_deleted, Some(true));
        assert!(command.name.is_none());
        assert!(command.attributes.is_none());
    }
}
