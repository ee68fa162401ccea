//! HTTP surface of the todo service.
//!
//! # Overview
//! `app` builds the axum `Router`: CRUD routes under `/<segment>`, a
//! preflight answer for OPTIONS on any path, and the middleware chain
//! trace → allow-any-origin header → authentication → handler.
//!
//! # Design
//! - The store and token verifier are injected through `AppState`; the same
//!   handlers serve the authenticated and the single-user configuration.
//! - Storage calls are bounded by `AppState::storage`, so a backend that
//!   never answers costs a 504 rather than a hung request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use todo_core::{ResourceLinks, StoreResult, TodoStore};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

pub use auth::{AuthError, Caller, FacebookTokenVerifier, StaticTokenVerifier, TokenVerifier};
pub use config::{AuthSettings, ConfigError, ServerConfig};
pub use error::ApiError;

/// Shared per-request context.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TodoStore>,
    verifier: Option<Arc<dyn TokenVerifier>>,
    links: ResourceLinks,
    storage_timeout: Duration,
}

impl AppState {
    /// Single-user state: no verifier, default storage timeout.
    pub fn new(store: Arc<dyn TodoStore>, links: ResourceLinks) -> Self {
        Self {
            store,
            verifier: None,
            links,
            storage_timeout: config::DEFAULT_STORAGE_TIMEOUT,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Fails only when the Graph API HTTP client cannot be built.
    pub fn from_config(
        config: &ServerConfig,
        store: Arc<dyn TodoStore>,
    ) -> Result<Self, AuthError> {
        let state = AppState::new(store, config.links()).with_storage_timeout(config.storage_timeout);
        let verifier: Arc<dyn TokenVerifier> = match &config.auth {
            AuthSettings::Disabled => return Ok(state),
            AuthSettings::Static(tokens) => Arc::new(StaticTokenVerifier::new(tokens.clone())),
            AuthSettings::Facebook { graph_url } => {
                Arc::new(FacebookTokenVerifier::new(graph_url, config.auth_timeout)?)
            }
        };
        Ok(state.with_verifier(verifier))
    }

    pub fn store(&self) -> &dyn TodoStore {
        self.store.as_ref()
    }

    pub fn verifier(&self) -> Option<&dyn TokenVerifier> {
        self.verifier.as_deref()
    }

    pub fn auth_required(&self) -> bool {
        self.verifier.is_some()
    }

    pub fn links(&self) -> &ResourceLinks {
        &self.links
    }

    /// Await a storage call, giving up after the configured timeout.
    pub async fn storage<T, F>(&self, operation: &'static str, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.storage_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ApiError::StorageTimeout {
                operation,
                timeout: self.storage_timeout,
            }),
        }
    }
}

pub fn app(state: AppState) -> Router {
    use handlers::*;

    let collection = state.links().collection_path();
    let item = format!("{collection}/{{id}}");

    let mut item_routes = get(get_todo)
        .patch(update_todo)
        .delete(delete_todo)
        .options(preflight);
    if !state.auth_required() {
        item_routes = item_routes.post(update_todo);
    }

    Router::new()
        .route(
            &collection,
            get(list_todos)
                .post(add_todo)
                .delete(clear_todos)
                .options(preflight),
        )
        .route(&item, item_routes)
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
