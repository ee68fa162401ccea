//! Domain model and storage contract for the todo service.
//!
//! # Overview
//! Holds everything the HTTP layer needs that is not HTTP: the `TodoItem`
//! record and its wire view, the caller identity, the permissive body field
//! parser, and the `TodoStore` trait with an in-memory implementation.
//!
//! # Design
//! - The store is a trait object injected by the server; nothing here is
//!   global.
//! - Every store operation is scoped by the owning user's id.
//! - `TodoView` is write-only. Inbound bodies go through `TodoFields`.

pub mod error;
pub mod fields;
pub mod memory;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use fields::TodoFields;
pub use memory::MemoryStore;
pub use store::{TodoDraft, TodoStore};
pub use types::{CallerIdentity, ResourceLinks, TodoItem, TodoView};
