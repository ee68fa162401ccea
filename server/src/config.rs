//! Server configuration.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use todo_core::{CallerIdentity, ResourceLinks};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SEGMENT: &str = "todos";
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("malformed static token entry {0:?}, expected token=id:name")]
    MalformedToken(String),
}

/// How callers are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSettings {
    /// Single-user mode: every request runs as the anonymous identity.
    Disabled,
    /// Fixed token table.
    Static(HashMap<String, CallerIdentity>),
    /// Tokens are Facebook access tokens checked against the Graph API.
    Facebook { graph_url: String },
}

impl AuthSettings {
    pub fn is_required(&self) -> bool {
        !matches!(self, AuthSettings::Disabled)
    }
}

/// Configuration for the todo server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Public URL prefix used when rendering item URLs. Derived from
    /// `bind_addr` when unset.
    pub base_url: Option<String>,
    /// Collection path segment, e.g. `todos`.
    pub segment: String,
    /// Upper bound on a single storage call.
    pub storage_timeout: Duration,
    /// Upper bound on a token provider round trip.
    pub auth_timeout: Duration,
    pub auth: AuthSettings,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            base_url: None,
            segment: DEFAULT_SEGMENT.to_string(),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            auth: AuthSettings::Facebook {
                graph_url: DEFAULT_GRAPH_URL.to_string(),
            },
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = segment.into();
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn with_auth(mut self, auth: AuthSettings) -> Self {
        self.auth = auth;
        self
    }

    pub fn links(&self) -> ResourceLinks {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.bind_addr));
        ResourceLinks::new(&base, &self.segment)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let host = match lookup("TODO_BIND_HOST") {
            Some(value) => value.parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                name: "TODO_BIND_HOST",
                value,
            })?,
            None => IpAddr::from([127, 0, 0, 1]),
        };

        let mut config = ServerConfig::new(SocketAddr::new(host, port));

        if let Some(url) = lookup("TODO_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(segment) = lookup("TODO_PATH_SEGMENT") {
            if segment.trim_matches('/').is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: "TODO_PATH_SEGMENT",
                    value: segment,
                });
            }
            config = config.with_segment(segment.trim_matches('/'));
        }
        if let Some(value) = lookup("TODO_STORAGE_TIMEOUT_MS") {
            config = config.with_storage_timeout(positive_millis("TODO_STORAGE_TIMEOUT_MS", value)?);
        }
        if let Some(value) = lookup("TODO_AUTH_TIMEOUT_MS") {
            config = config.with_auth_timeout(positive_millis("TODO_AUTH_TIMEOUT_MS", value)?);
        }

        let auth = match lookup("TODO_AUTH").as_deref() {
            None | Some("facebook") => AuthSettings::Facebook {
                graph_url: lookup("TODO_FACEBOOK_GRAPH_URL")
                    .unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string()),
            },
            Some("static") => {
                AuthSettings::Static(parse_static_tokens(&lookup("TODO_STATIC_TOKENS").unwrap_or_default())?)
            }
            Some("none") => AuthSettings::Disabled,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "TODO_AUTH",
                    value: other.to_string(),
                })
            }
        };

        Ok(config.with_auth(auth))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
    }
}

fn positive_millis(name: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}

/// Parse `token=id:name` entries separated by commas.
fn parse_static_tokens(raw: &str) -> Result<HashMap<String, CallerIdentity>, ConfigError> {
    let mut tokens = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (token, identity) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedToken(entry.to_string()))?;
        let (id, name) = identity.split_once(':').unwrap_or((identity, identity));
        if token.is_empty() || id.is_empty() {
            return Err(ConfigError::MalformedToken(entry.to_string()));
        }
        tokens.insert(token.to_string(), CallerIdentity::new(id, name));
    }
    Ok(tokens)
}
