//! Contact persistence.
//!
//! [`ContactRepository`] is the only seam through which contacts are read or
//! written. Implementations are stateless apart from their connection handle,
//! so one instance is shared by every request.

pub mod classify;
pub mod memory;
pub mod postgres;

use crate::domain::{Contact, ContactInput, ContactPage, ContactResult, PageRequest, PatchPlan};
use async_trait::async_trait;

pub use classify::classify_storage_error;
pub use memory::InMemoryContactRepository;
pub use postgres::PgContactRepository;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Inserts a validated contact, stamping both timestamps with the current second.
    async fn create(&self, input: &ContactInput) -> ContactResult<Contact>;

    async fn get_by_id(&self, id: i64) -> ContactResult<Contact>;

    /// One page of contacts ordered by id ascending.
    async fn list(&self, page: PageRequest) -> ContactResult<ContactPage>;

    /// Full replace of the mutable fields; returns the row as re-read after the write.
    async fn update(&self, id: i64, input: &ContactInput) -> ContactResult<Contact>;

    /// Applies a diff-builder plan as a single update. Callers re-read to build a response.
    async fn patch(&self, plan: &PatchPlan) -> ContactResult<()>;

    async fn delete(&self, id: i64) -> ContactResult<()>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> ContactResult<()>;
}
