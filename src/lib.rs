pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::{Contact, ContactError, ContactInput, ContactPatch, ContactResult};
pub use storage::{ContactRepository, InMemoryContactRepository, PgContactRepository};
