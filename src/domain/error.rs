//! Error taxonomy shared by validation, the repositories and the HTTP layer.

use thiserror::Error;

/// Client input defects found before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty (after trimming) or explicitly null.
    #[error("{0} is required")]
    RequiredField(&'static str),

    /// A field does not have the expected shape.
    #[error("invalid {0}")]
    InvalidFormat(&'static str),

    /// A partial update that would change nothing.
    #[error("no updatable fields provided")]
    EmptyPatch,
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("contact {0} not found")]
    NotFound(i64),

    #[error("email already exists")]
    DuplicateEmail,

    #[error("{0}")]
    StorageUnavailable(String),

    #[error("invalid id: {0:?}")]
    MalformedIdentifier(String),

    #[error("{0}")]
    MalformedBody(String),
}

pub type ContactResult<T> = Result<T, ContactError>;
