//! The storage contract the HTTP layer is written against.
//!
//! # Design
//! Every operation is keyed by the owning user's id, and by-id operations by
//! the document id as well. A backend must never return or mutate a document
//! that lives in a different user's collection; that scoping is the only
//! thing keeping one caller away from another's todos.
//!
//! Concurrency discipline (isolation between users, atomicity of a single
//! document write) belongs to the implementation. Two concurrent updates of
//! the same document may race; the last write wins.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::fields::TodoFields;
use crate::types::TodoItem;

/// The mutable fields of a todo, as written by add and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub order: i64,
    pub completed: bool,
}

impl From<&TodoFields> for TodoDraft {
    fn from(fields: &TodoFields) -> Self {
        TodoDraft {
            title: fields.title.clone(),
            order: fields.order,
            completed: fields.completed,
        }
    }
}

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// All documents owned by `user`.
    async fn list(&self, user: &str) -> StoreResult<Vec<TodoItem>>;

    /// A single document, or `None` if `user` owns no document `id`.
    async fn get(&self, user: &str, id: &str) -> StoreResult<Option<TodoItem>>;

    /// Create a document and assign it a fresh id.
    async fn add(&self, user: &str, draft: TodoDraft) -> StoreResult<TodoItem>;

    /// Replace every mutable field of an existing document.
    ///
    /// Returns `Ok(None)` when `user` owns no document `id`.
    async fn update(&self, user: &str, id: &str, draft: TodoDraft)
        -> StoreResult<Option<TodoItem>>;

    /// Remove one document. Fails with `StoreError::NotFound` if absent.
    async fn delete(&self, user: &str, id: &str) -> StoreResult<()>;

    /// Remove every document owned by `user`. Succeeds on an empty collection.
    async fn clear(&self, user: &str) -> StoreResult<()>;
}
