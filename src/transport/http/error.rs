//! The single place where classified errors become HTTP statuses.

use crate::domain::{ContactError, ValidationError};
use crate::transport::http::types::ErrorBody;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::any::Any;

#[derive(Debug)]
pub struct ApiError(pub ContactError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ContactError::Validation(ValidationError::EmptyPatch) => StatusCode::BAD_REQUEST,
            ContactError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ContactError::NotFound(_) => StatusCode::NOT_FOUND,
            ContactError::DuplicateEmail => StatusCode::CONFLICT,
            ContactError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::MalformedIdentifier(_) | ContactError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ContactError::MalformedBody(rejection.body_text()))
    }
}

// Path segments that fail to decode (e.g. percent-encoded invalid UTF-8)
// never reach `parse_id`.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ContactError::MalformedIdentifier(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(%status, error = %self.0, "request rejected");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Response for a handler panic, keeping the `{"error": ...}` shape.
pub fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    let body = ErrorBody {
        error: "internal server error".to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
