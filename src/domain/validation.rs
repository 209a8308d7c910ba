//! Payload validation for full writes. Pure functions, no storage access.

use crate::domain::contact::ContactInput;
use crate::domain::error::ValidationError;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
    })
}

/// `local@domain.tld`: a single `@`, a `.` after it, no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredField(field));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> Result<(), ValidationError> {
    if !is_valid_email(value) {
        return Err(ValidationError::InvalidFormat("email"));
    }
    Ok(())
}

/// Checks a full-write payload. Company and phone are unconstrained.
pub fn validate(input: &ContactInput) -> Result<(), ValidationError> {
    require_text("firstName", &input.first_name)?;
    require_text("lastName", &input.last_name)?;
    require_email(&input.email)?;
    Ok(())
}
