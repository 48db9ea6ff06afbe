//! Pure domain logic for the todo core: key derivation, command assembly,
//! search query composition and the tenant guard. No I/O here — everything
//! that talks to a store lives in `todo-core`.

pub mod tenant;
pub mod todo;
