//! Field-diff builder: turns a sparse [`ContactPatch`] into an ordered list of
//! column assignments for a single UPDATE.
//!
//! Column names come from [`Column::as_sql`] only; values are always bound.

use crate::domain::contact::ContactPatch;
use crate::domain::error::ValidationError;
use crate::domain::validation::{require_email, require_text};
use chrono::{DateTime, Utc};

/// Updatable columns of the `contacts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    FirstName,
    LastName,
    Company,
    Email,
    Phone,
    UpdatedAt,
}

impl Column {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::Company => "company",
            Column::Email => "email",
            Column::Phone => "phone",
            Column::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Text(String),
    Null,
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: Column,
    pub value: ColumnValue,
}

/// Output of [`build_patch`]: what to set, and on which row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    pub id: i64,
    pub assignments: Vec<Assignment>,
}

impl PatchPlan {
    /// The value assigned to `column`, if the plan touches it.
    pub fn value_of(&self, column: Column) -> Option<&ColumnValue> {
        self.assignments
            .iter()
            .find(|a| a.column == column)
            .map(|a| &a.value)
    }
}

/// Builds the assignment list for `patch` against row `id`.
///
/// Fields are processed in declaration order and the first invalid one fails
/// the whole patch. `updated_at = now` is always appended last; a plan that
/// would only bump the timestamp is rejected as [`ValidationError::EmptyPatch`].
pub fn build_patch(
    id: i64,
    patch: &ContactPatch,
    now: DateTime<Utc>,
) -> Result<PatchPlan, ValidationError> {
    let mut assignments = Vec::with_capacity(6);

    if let Some(value) = &patch.first_name {
        let value = value.as_deref().ok_or(ValidationError::RequiredField("firstName"))?;
        require_text("firstName", value)?;
        assignments.push(text(Column::FirstName, value));
    }
    if let Some(value) = &patch.last_name {
        let value = value.as_deref().ok_or(ValidationError::RequiredField("lastName"))?;
        require_text("lastName", value)?;
        assignments.push(text(Column::LastName, value));
    }
    if let Some(value) = &patch.company {
        assignments.push(nullable(Column::Company, value.as_deref()));
    }
    if let Some(value) = &patch.email {
        let value = value.as_deref().ok_or(ValidationError::InvalidFormat("email"))?;
        require_email(value)?;
        assignments.push(text(Column::Email, value));
    }
    if let Some(value) = &patch.phone {
        assignments.push(nullable(Column::Phone, value.as_deref()));
    }

    if assignments.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }

    assignments.push(Assignment {
        column: Column::UpdatedAt,
        value: ColumnValue::Timestamp(now),
    });

    Ok(PatchPlan { id, assignments })
}

fn text(column: Column, value: &str) -> Assignment {
    Assignment {
        column,
        value: ColumnValue::Text(value.to_string()),
    }
}

fn nullable(column: Column, value: Option<&str>) -> Assignment {
    Assignment {
        column,
        value: value.map_or(ColumnValue::Null, |v| ColumnValue::Text(v.to_string())),
    }
}
