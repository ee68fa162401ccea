use std::sync::Arc;

use todo_core::MemoryStore;
use todo_server::{AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;
    let state = AppState::from_config(&config, Arc::new(MemoryStore::new()))?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        segment = %state.links().segment(),
        auth = config.auth.is_required(),
        auth_timeout_ms = config.auth_timeout.as_millis() as u64,
        "listening"
    );
    todo_server::run(listener, state).await?;
    Ok(())
}
