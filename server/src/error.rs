//! HTTP-facing errors.
//!
//! # Design
//! Clients only ever see a status code: every handler failure answers 400
//! with an empty body, whatever the cause, so existing clients that match on
//! 400 keep working. The variant exists for the log line. Two exceptions:
//! a storage call that outlives its timeout answers 504, and the
//! authentication gate answers 401.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_core::StoreError;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request does not contain parameter {0}")]
    MissingParameter(&'static str),

    #[error("no body found in request")]
    MissingBody,

    #[error("body is invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("request does not contain a caller identity")]
    MissingIdentity,

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("could not find todo {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("storage call {operation} did not complete within {timeout:?}")]
    StorageTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("authentication failed: {0}")]
    Unauthorized(#[from] AuthError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::StorageTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::NotFound(_) | ApiError::StorageTimeout { .. } => {
                tracing::warn!("{self}")
            }
            ApiError::Unauthorized(AuthError::Provider(_)) => tracing::error!("{self}"),
            ApiError::Unauthorized(_) => tracing::warn!("{self}"),
            _ => tracing::error!("{self}"),
        }
        self.status_code().into_response()
    }
}
