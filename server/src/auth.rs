//! Authentication gate.
//!
//! The middleware pulls a credential off the request, hands it to the
//! configured `TokenVerifier`, and stores the resulting `CallerIdentity` in
//! the request extensions. Handlers read it back through the `Caller`
//! extractor and never re-validate it. OPTIONS requests pass through
//! untouched so preflight works without credentials.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use thiserror::Error;
use todo_core::CallerIdentity;

use crate::error::ApiError;
use crate::AppState;

/// Header carrying a token in the Kitura credentials style.
pub const ACCESS_TOKEN_HEADER: &str = "access_token";
pub const TOKEN_TYPE_HEADER: &str = "x-token-type";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no credentials supplied")]
    MissingCredentials,

    #[error("unsupported token type {0:?}")]
    UnsupportedTokenType(String),

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("token provider unreachable: {0}")]
    Provider(#[from] reqwest::Error),
}

/// Turns a bearer credential into a verified identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError>;
}

/// Verifier backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, CallerIdentity>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, CallerIdentity>) -> Self {
        Self { tokens }
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: CallerIdentity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".into()))
    }
}

/// Verifier that asks the Facebook Graph API who owns an access token.
#[derive(Debug, Clone)]
pub struct FacebookTokenVerifier {
    client: reqwest::Client,
    graph_url: String,
}

#[derive(Deserialize)]
struct GraphProfile {
    id: String,
    #[serde(default)]
    name: String,
}

impl FacebookTokenVerifier {
    /// A Graph API call that outlives `timeout` fails as `AuthError::Provider`.
    pub fn new(graph_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            graph_url: graph_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TokenVerifier for FacebookTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let response = self
            .client
            .get(format!("{}/me", self.graph_url))
            .query(&[("fields", "id,name"), ("access_token", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::InvalidToken(format!("graph api returned {status}")));
        }

        let profile: GraphProfile = response.json().await?;
        Ok(CallerIdentity::new(profile.id, profile.name))
    }
}

/// Extract the caller's token from request headers.
///
/// `Authorization: Bearer <token>` wins (the scheme is matched without
/// regard to case); otherwise an `access_token` header
/// is accepted when `X-token-type` is absent or `FacebookToken`.
pub fn credential(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        return value
            .trim()
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::InvalidToken("malformed authorization header".into()));
    }

    let token = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    match headers.get(TOKEN_TYPE_HEADER).and_then(|h| h.to_str().ok()) {
        None | Some("FacebookToken") => Ok(token),
        Some(other) => Err(AuthError::UnsupportedTokenType(other.to_string())),
    }
}

/// Authentication middleware.
///
/// With a verifier configured, every non-OPTIONS request must carry a valid
/// token or is rejected with 401 before any handler runs. Without one, the
/// request proceeds as the anonymous identity.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let identity = match state.verifier() {
        None => CallerIdentity::anonymous(),
        Some(verifier) => {
            let token = credential(request.headers())?;
            verifier.verify(token).await?
        }
    };

    tracing::debug!(user = %identity.id, "authenticated request");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// The verified caller of the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerIdentity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .map(Caller)
            .ok_or(ApiError::MissingIdentity)
    }
}
