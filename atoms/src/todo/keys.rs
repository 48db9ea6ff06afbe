use thiserror::Error;
use uuid::Uuid;

/// Type prefix shared by every todo partition key, disambiguating todos
/// from other entity kinds in the same table.
pub const TODO_PK_PREFIX: &str = "TODO";

const KEY_SEPARATOR: char = '#';

/// A partition key that does not parse as a todo key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("malformed todo partition key: {0}")]
    MalformedPk(String),
}

/// Partition key for a tenant's todos: `TODO#<tenant_code>`.
pub fn todo_pk(tenant_code: &str) -> String {
    format!("{}{}{}", TODO_PK_PREFIX, KEY_SEPARATOR, tenant_code)
}

/// Fresh sort key; unique within any partition.
pub fn todo_sk() -> String {
    Uuid::new_v4().to_string()
}

/// Stable composite id for one todo.
pub fn todo_id(pk: &str, sk: &str) -> String {
    format!("{}{}{}", pk, KEY_SEPARATOR, sk)
}

/// Inverse of [`todo_pk`]: extracts the tenant code.
pub fn parse_pk(pk: &str) -> Result<&str, KeyError> {
    match pk.split_once(KEY_SEPARATOR) {
        Some((prefix, tenant)) if prefix == TODO_PK_PREFIX && !tenant.is_empty() => Ok(tenant),
        _ => Err(KeyError::MalformedPk(pk.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pk_carries_type_prefix_and_tenant() {
        assert_eq!(todo_pk("acme"), "TODO#acme");
    }

    #[test]
    fn pk_round_trips_through_parse() {
        assert_eq!(parse_pk(&todo_pk("acme")).unwrap(), "acme");
    }

    #[test]
    fn parse_rejects_foreign_or_malformed_keys() {
        for bad in ["USER#acme", "TODO", "TODO#", "acme", ""] {
            assert!(parse_pk(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn parse_keeps_separators_inside_tenant_code() {
        // Only the first separator splits; the rest belongs to the tenant.
        assert_eq!(parse_pk("TODO#acme#east").unwrap(), "acme#east");
    }

    #[test]
    fn id_is_pk_and_sk_joined() {
        assert_eq!(todo_id("TODO#acme", "abc"), "TODO#acme#abc");
    }

    #[test]
    fn sort_keys_do_not_collide() {
        assert_ne!(todo_sk(), todo_sk());
    }
}
