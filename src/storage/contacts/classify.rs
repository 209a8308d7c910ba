//! Storage-error classification for the PostgreSQL backend.
//!
//! Email uniqueness is enforced by the database, so a conflicting write is only
//! detected afterwards, from the error it produces. Everything backend-specific
//! about recognising that error lives here.

use crate::domain::ContactError;

/// Maps a failed statement onto the contact error taxonomy.
///
/// `RowNotFound` is not handled here: callers decide what "no row" means for
/// their operation.
pub fn classify_storage_error(err: sqlx::Error) -> ContactError {
    if let sqlx::Error::Database(db_err) = &err {
        let mut text = db_err.message().to_string();
        if let Some(constraint) = db_err.constraint() {
            text.push(' ');
            text.push_str(constraint);
        }
        if is_unique_email_violation(&text) {
            return ContactError::DuplicateEmail;
        }
    }
    ContactError::StorageUnavailable(err.to_string())
}

/// Looks for a uniqueness marker and the email column name in the error text.
///
/// PostgreSQL reports `duplicate key value violates unique constraint
/// "contacts_email_key"`; the wording differs between engines and versions, so
/// either marker is accepted.
pub fn is_unique_email_violation(text: &str) -> bool {
    let text = text.to_lowercase();
    (text.contains("duplicate") || text.contains("unique")) && text.contains("email")
}
