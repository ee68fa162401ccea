//! Route handlers.
//!
//! Every handler checks its preconditions in the same order: path
//! parameter, then body, then caller identity. The extractors for those are
//! taken as `Result`s so the first failure in that order is the one
//! reported, regardless of the order axum runs extractors in.

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, FromRequest, Path, Request, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use todo_core::{TodoDraft, TodoFields, TodoView};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::AppState;

pub const ALLOW_HEADERS: &str = "accept, content-type";
pub const ALLOW_METHODS: &str = "GET,HEAD,POST,DELETE,OPTIONS,PUT,PATCH";

/// A request body parsed into `TodoFields`.
///
/// Rejects a missing/empty body and anything that is not JSON. Field-level
/// problems are not errors; see `TodoFields::from_json`.
#[derive(Debug)]
pub struct TodoBody(pub TodoFields);

impl<S> FromRequest<S> for TodoBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::MissingBody)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::MissingBody);
        }

        let value: Value = serde_json::from_slice(&bytes)?;
        let fields = TodoFields::from_json(&value);
        if !fields.defaulted.is_empty() {
            tracing::debug!(defaulted = ?fields.defaulted, "body fields fell back to defaults");
        }
        Ok(TodoBody(fields))
    }
}

fn path_id(id: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    match id {
        Ok(Path(id)) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::MissingParameter("id")),
    }
}

fn body_fields(body: Result<TodoBody, ApiError>) -> Result<TodoFields, ApiError> {
    let TodoBody(fields) = body?;
    Ok(fields)
}

/// GET `/`: every todo the caller owns.
pub async fn list_todos(
    State(state): State<AppState>,
    caller: Result<Caller, ApiError>,
) -> Result<Json<Vec<TodoView>>, ApiError> {
    let Caller(caller) = caller?;

    let items = state.storage("list", state.store().list(&caller.id)).await?;
    let links = state.links();
    Ok(Json(items.iter().map(|item| item.view(links)).collect()))
}

/// GET `/{id}`
pub async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    caller: Result<Caller, ApiError>,
) -> Result<Json<TodoView>, ApiError> {
    let id = path_id(id)?;
    let Caller(caller) = caller?;

    let item = state.storage("get", state.store().get(&caller.id, &id)).await?;
    item.map(|item| Json(item.view(state.links())))
        .ok_or(ApiError::NotFound(id))
}

/// POST `/`: create a todo owned by the caller.
pub async fn add_todo(
    State(state): State<AppState>,
    caller: Result<Caller, ApiError>,
    body: Result<TodoBody, ApiError>,
) -> Result<Json<TodoView>, ApiError> {
    let fields = body_fields(body)?;
    let Caller(caller) = caller?;
    if !fields.has_title() {
        return Err(ApiError::EmptyTitle);
    }

    tracing::info!(user = %caller.id, title = %fields.title, "received new todo");
    let item = state
        .storage("add", state.store().add(&caller.id, TodoDraft::from(&fields)))
        .await?;
    Ok(Json(item.view(state.links())))
}

/// PATCH `/{id}`, and POST `/{id}` when authentication is disabled.
///
/// Replaces title, order and completed wholesale. The owner comes from the
/// verified caller; a `user` in the body is only honoured in single-user
/// mode, where there is no verified caller to trust.
pub async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    caller: Result<Caller, ApiError>,
    body: Result<TodoBody, ApiError>,
) -> Result<Json<TodoView>, ApiError> {
    let id = path_id(id)?;
    let fields = body_fields(body)?;
    let Caller(caller) = caller?;
    if !fields.has_title() {
        return Err(ApiError::EmptyTitle);
    }

    let owner = match &fields.user {
        Some(user) if !state.auth_required() => user.clone(),
        _ => caller.id,
    };

    let item = state
        .storage("update", state.store().update(&owner, &id, TodoDraft::from(&fields)))
        .await?;
    item.map(|item| Json(item.view(state.links())))
        .ok_or(ApiError::NotFound(id))
}

/// DELETE `/{id}`
pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    caller: Result<Caller, ApiError>,
) -> Result<StatusCode, ApiError> {
    let id = path_id(id)?;
    let Caller(caller) = caller?;

    tracing::info!(user = %caller.id, %id, "deleting todo");
    state.storage("delete", state.store().delete(&caller.id, &id)).await?;
    Ok(StatusCode::OK)
}

/// DELETE `/`: drop the caller's whole collection.
pub async fn clear_todos(
    State(state): State<AppState>,
    caller: Result<Caller, ApiError>,
) -> Result<StatusCode, ApiError> {
    let Caller(caller) = caller?;

    tracing::info!(user = %caller.id, "clearing todo list");
    state.storage("clear", state.store().clear(&caller.id)).await?;
    Ok(StatusCode::OK)
}

/// OPTIONS on any path. Needs no credentials and never touches storage.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS)),
            (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS)),
        ],
    )
}

/// Unmatched paths: preflight still answers, everything else is 404.
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        preflight().await.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
