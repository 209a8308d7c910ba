//! Contact domain: resource shapes, validation, partial-update diffing and the error taxonomy.

pub mod contact;
pub mod diff;
pub mod error;
pub mod validation;

pub use contact::{Contact, ContactInput, ContactPage, ContactPatch, ListQuery, PageRequest};
pub use diff::{build_patch, Assignment, Column, ColumnValue, PatchPlan};
pub use error::{ContactError, ContactResult, ValidationError};
pub use validation::{is_valid_email, validate};
