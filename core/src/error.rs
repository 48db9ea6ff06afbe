use thiserror::Error;
use todo_atoms::tenant::TenantMismatch;
use todo_atoms::todo::KeyError;

/// Errors surfaced by the todo core. Every variant propagates to the
/// caller unmodified; conflicts are not retried here.
#[derive(Debug, Error)]
pub enum TodoError {
    /// No projection row exists for the requested key.
    #[error("todo not found")]
    NotFound,

    /// Acting tenant does not match the resource tenant.
    #[error(transparent)]
    Authorization(#[from] TenantMismatch),

    /// The command targeted a version the store has already moved past.
    /// The caller may re-read and retry; this core never does.
    #[error("stale version {target} for {id}: current version is {current}")]
    Conflict {
        id: String,
        target: i64,
        current: i64,
    },

    /// Malformed key or request shape.
    #[error(transparent)]
    Validation(#[from] KeyError),

    /// Collaborator transport failure.
    #[error("store error: {0}")]
    Store(String),
}
