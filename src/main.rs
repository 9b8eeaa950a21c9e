//! TLS session proxy service binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tls_proxy::config::{load_config, ProxyConfig};
use tls_proxy::http::HttpServer;
use tls_proxy::observability::metrics;
use tls_proxy::proxy::RequestExecutor;
use tls_proxy::session::SessionStore;
use tls_proxy::transport::TlsClientFactory;

#[derive(Parser)]
#[command(name = "tls-proxy", about = "Session-keeping TLS forwarding proxy")]
struct Args {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    // Initialize tracing subscriber; RUST_LOG wins over the config level.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tls_proxy={},tower_http=info", config.observability.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("tls-proxy v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_sessions = config.session.max_sessions,
        session_ttl_secs = config.session.ttl_secs,
        identity_profile = %config.upstream.identity_profile,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let factory = Arc::new(TlsClientFactory::new(config.upstream.clone()));
    let store = Arc::new(SessionStore::new(config.session.clone(), factory));
    store.start().await;

    let executor = Arc::new(RequestExecutor::new(
        Arc::clone(&store),
        config.upstream.max_redirects,
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, Arc::clone(&store), executor);
    server.run(listener).await?;

    // The server only returns once the listener has drained; release every
    // remaining session before exiting.
    store.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
