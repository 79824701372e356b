use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use logging_manual::env::ServerConfig;
use logging_manual::handler::{build_router, AppState};
use logging_manual::init::init_tracing;
use logging_manual::sink::{LogSink, StdoutSink};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let sink: Arc<dyn LogSink> = Arc::new(StdoutSink);
    init_tracing(Arc::clone(&sink)).context("install tracing subscriber")?;

    let config = ServerConfig::from_env()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    // Any bind failure ends the process; there is no fallback port.
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!(port = config.port, "Listening on port {}", config.port);

    axum::serve(listener, build_router(AppState::new(sink)))
        .await
        .context("serve http")?;
    Ok(())
}
