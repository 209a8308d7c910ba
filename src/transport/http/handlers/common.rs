use crate::domain::ContactError;

/// Parses a path identifier: surrounding whitespace is ignored, an explicit
/// leading `+` sign is accepted and the value must be a positive integer.
pub fn parse_id(raw: &str) -> Result<i64, ContactError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ContactError::MalformedIdentifier(raw.to_string())),
    }
}
