pub mod contacts;

pub use contacts::{ContactRepository, InMemoryContactRepository, PgContactRepository};
