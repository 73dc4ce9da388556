//! ringcache - A distributed read-through cache node
//!
//! Serves client lookups and peer requests over HTTP and keeps its ring in step with the
//! configured membership source.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ringcache::{
    api::{create_router, AppState},
    cache::LruStore,
    cluster::{DnsMembership, MembershipSource},
    node::{Cache, HttpOrigin, Options},
    peer::HttpPeerFactory,
    spawn_discovery_task, Config,
};

/// Main entry point for a ringcache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the tiers, origin client and peer factory, then the node itself
/// 4. Start membership discovery if a DNS target is configured
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ringcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ringcache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: node_addr={}, port={}, hot_cache_bytes={}, local_cache_bytes={}, peers={:?}, origin={}",
        config.node_addr,
        config.server_port,
        config.hot_cache_bytes,
        config.local_cache_bytes,
        config.peers,
        config.origin_url
    );

    let origin = HttpOrigin::new(&config.origin_url, config.request_timeout)
        .with_context(|| format!("invalid ORIGIN_URL {}", config.origin_url))?;

    let cache = Cache::new(Options {
        me: config.node_addr.clone(),
        hot_store: Arc::new(LruStore::new(config.hot_cache_bytes)),
        local_store: Arc::new(LruStore::new(config.local_cache_bytes)),
        getter: Arc::new(origin),
        peer_factory: Arc::new(HttpPeerFactory::new(config.peer_timeout)),
        peers: config.peers.clone(),
    });
    info!("Cache node initialized");

    let discovery_handle = config.discovery_dns.as_ref().map(|target| {
        let source: Arc<dyn MembershipSource> = Arc::new(DnsMembership::new(target.as_str()));
        info!("Membership discovery started for {}", target);
        spawn_discovery_task(cache.clone(), source, config.discovery_interval)
    });

    let app = create_router(AppState::new(cache.clone(), config.request_timeout));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(discovery_handle))
        .await
        .context("server error")?;

    cache.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the discovery task and allows graceful shutdown.
async fn shutdown_signal(discovery_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = discovery_handle {
        handle.abort();
        warn!("Discovery task aborted");
    }
}
