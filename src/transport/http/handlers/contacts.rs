//! `/contacts` resource handlers.
//!
//! Each handler runs decode -> validate (or diff) -> repository and leaves all
//! status mapping to [`ApiError`].

use crate::domain::contact::now_utc;
use crate::domain::{
    build_patch, validate, Contact, ContactInput, ContactPage, ContactPatch, ListQuery,
};
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::parse_id;
use crate::transport::http::types::{AppState, ErrorBody};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/contacts",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of contacts ordered by id", body = ContactPage),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ContactPage>, ApiError> {
    // A query string that does not even decode is treated like an absent one.
    let page = query.map(|Query(q)| q.page_request()).unwrap_or_default();
    let page = state.contacts.list(page).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/contacts/{id}",
    params(("id" = i64, Path, description = "Contact id")),
    responses(
        (status = 200, description = "The contact", body = Contact),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such contact", body = ErrorBody),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Contact>, ApiError> {
    let Path(raw_id) = path?;
    let id = parse_id(&raw_id)?;
    let contact = state.contacts.get_by_id(id).await?;
    Ok(Json(contact))
}

#[utoipa::path(
    post,
    path = "/contacts",
    request_body = ContactInput,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = body?;
    validate(&input)?;

    let contact = state.contacts.create(&input).await?;
    tracing::info!(id = contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

#[utoipa::path(
    put,
    path = "/contacts/{id}",
    params(("id" = i64, Path, description = "Contact id")),
    request_body = ContactInput,
    responses(
        (status = 200, description = "Contact replaced; body is the re-read row", body = Contact),
        (status = 400, description = "Malformed id or body", body = ErrorBody),
        (status = 404, description = "No such contact", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn update_contact(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> Result<Json<Contact>, ApiError> {
    let Path(raw_id) = path?;
    let id = parse_id(&raw_id)?;
    let Json(input) = body?;
    validate(&input)?;

    let contact = state.contacts.update(id, &input).await?;
    Ok(Json(contact))
}

#[utoipa::path(
    patch,
    path = "/contacts/{id}",
    params(("id" = i64, Path, description = "Contact id")),
    request_body = ContactPatch,
    responses(
        (status = 200, description = "Contact patched; body is the re-read row", body = Contact),
        (status = 400, description = "Malformed id or body, or nothing to change", body = ErrorBody),
        (status = 404, description = "No such contact", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn patch_contact(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ContactPatch>, JsonRejection>,
) -> Result<Json<Contact>, ApiError> {
    let Path(raw_id) = path?;
    let id = parse_id(&raw_id)?;
    let Json(patch) = body?;
    let plan = build_patch(id, &patch, now_utc())?;

    state.contacts.patch(&plan).await?;
    let contact = state.contacts.get_by_id(id).await?;
    Ok(Json(contact))
}

#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    params(("id" = i64, Path, description = "Contact id")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such contact", body = ErrorBody),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(raw_id) = path?;
    let id = parse_id(&raw_id)?;
    state.contacts.delete(id).await?;
    tracing::info!(id, "contact deleted");
    Ok(StatusCode::NO_CONTENT)
}
