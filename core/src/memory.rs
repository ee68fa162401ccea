//! In-memory `TodoStore`.
//!
//! Documents are kept per user behind a single `RwLock`, so the user-scoped
//! key is literally the first map lookup. Ids are random UUIDs and are never
//! handed out twice.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{TodoDraft, TodoStore};
use crate::types::TodoItem;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, HashMap<String, TodoItem>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self, user: &str) -> StoreResult<Vec<TodoItem>> {
        let users = self.users.read().await;
        let mut items: Vec<TodoItem> = users
            .get(user)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        // HashMap iteration order is arbitrary; keep listings stable.
        items.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn get(&self, user: &str, id: &str) -> StoreResult<Option<TodoItem>> {
        let users = self.users.read().await;
        Ok(users.get(user).and_then(|docs| docs.get(id)).cloned())
    }

    async fn add(&self, user: &str, draft: TodoDraft) -> StoreResult<TodoItem> {
        let item = TodoItem {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
            order: draft.order,
            title: draft.title,
            completed: draft.completed,
        };
        self.users
            .write()
            .await
            .entry(user.to_string())
            .or_default()
            .insert(item.id.clone(), item.clone());
        tracing::debug!(user, id = %item.id, "stored new todo");
        Ok(item)
    }

    async fn update(
        &self,
        user: &str,
        id: &str,
        draft: TodoDraft,
    ) -> StoreResult<Option<TodoItem>> {
        let mut users = self.users.write().await;
        let Some(item) = users.get_mut(user).and_then(|docs| docs.get_mut(id)) else {
            return Ok(None);
        };
        item.title = draft.title;
        item.order = draft.order;
        item.completed = draft.completed;
        Ok(Some(item.clone()))
    }

    async fn delete(&self, user: &str, id: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        users
            .get_mut(user)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(user, id))
    }

    async fn clear(&self, user: &str) -> StoreResult<()> {
        let removed = self.users.write().await.remove(user).map_or(0, |docs| docs.len());
        tracing::debug!(user, removed, "cleared todo collection");
        Ok(())
    }
}
