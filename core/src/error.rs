//! Error types for todo storage backends.
//!
//! # Design
//! `NotFound` gets a dedicated variant so the HTTP layer can log it at a
//! lower level than genuine backend failures, even though both currently
//! surface to clients the same way. Everything a concrete backend can go
//! wrong with lands in `Backend` as a message.

use thiserror::Error;

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document `id` exists in `user`'s collection.
    #[error("todo {id} not found for user {user}")]
    NotFound { user: String, id: String },

    /// The backend failed for a reason of its own.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(user: &str, id: &str) -> Self {
        StoreError::NotFound {
            user: user.to_string(),
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
