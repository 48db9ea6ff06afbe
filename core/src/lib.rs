//! Todo orchestration core: command publication with optimistic
//! concurrency, tenant-guarded mutations, composed projection queries and
//! the completion-triggered task hook. Persistence and transport are
//! collaborator traits; see [`stores`].

pub mod error;
pub mod memory;
pub mod service;
pub mod stores;

pub use error::TodoError;
pub use service::{TodoEvent, TodoService};
pub use stores::{ActorContext, CommandStore, ProjectionStore, TaskNotifier, TaskRequest};

// Re-export the domain leaves so callers need a single dependency.
pub use todo_atoms::tenant;
pub use todo_atoms::todo;

pub type Result<T> = std::result::Result<T, TodoError>;
