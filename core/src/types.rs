//! Domain types for the todo service.
//!
//! # Design
//! `TodoItem` is the stored record. It carries no URL: the public resource
//! URL depends on where the service is mounted, so it is derived at
//! serialization time from `ResourceLinks`. `TodoView` is the only wire
//! representation of an item and is write-only; inbound bodies are parsed
//! field-by-field by `TodoFields` instead.

use serde::{Deserialize, Serialize};

/// A single todo item as held by a `TodoStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub user: String,
    pub order: i64,
    pub title: String,
    pub completed: bool,
}

impl TodoItem {
    /// Render the item for a response body, deriving its `url` from `links`.
    pub fn view(&self, links: &ResourceLinks) -> TodoView {
        TodoView {
            id: self.id.clone(),
            user: self.user.clone(),
            order: self.order,
            title: self.title.clone(),
            completed: self.completed,
            url: links.item_url(&self.id),
        }
    }
}

/// Wire shape of a todo item. Field order is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoView {
    pub id: String,
    pub user: String,
    pub order: i64,
    pub title: String,
    pub completed: bool,
    pub url: String,
}

/// Where the collection is exposed: `<base_url>/<segment>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLinks {
    base_url: String,
    segment: String,
}

impl ResourceLinks {
    pub fn new(base_url: &str, segment: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            segment: segment.trim_matches('/').to_string(),
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Router path of the collection, e.g. `/todos`.
    pub fn collection_path(&self) -> String {
        format!("/{}", self.segment)
    }

    pub fn item_url(&self, id: &str) -> String {
        format!("{}/{}/{id}", self.base_url, self.segment)
    }
}

/// A verified caller, as produced by the authentication gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: String,
    pub name: String,
}

impl CallerIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Identity every request runs as when authentication is disabled.
    pub fn anonymous() -> Self {
        Self::new("anonymous", "Anonymous")
    }
}
