mod cache;
mod config;
mod controller;
mod flows;
mod handlers;
mod metrics;
mod models;
mod provision;
mod router;
mod topology;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache::TopologyCache;
use config::Config;
use controller::ControllerClient;
use metrics::{MetricsPoller, MetricsStore};
use provision::Provisioner;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub topology: Arc<TopologyCache>,
    pub provisioner: Provisioner,
    pub metrics: Arc<MetricsStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sdn_provisioner=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting SDN provisioner");
    tracing::info!("Controller: {}", cfg.controller_url());
    tracing::info!("Topology cache: {}s", cfg.topology_cache_secs);
    tracing::info!("Listen: {}", cfg.listen_addr);

    let controller = Arc::new(ControllerClient::from_config(&cfg)?);

    let topology = Arc::new(TopologyCache::new(controller.clone(), cfg.topology_cache_window()));
    let provisioner = Provisioner::new(controller.clone());
    let metrics_store = Arc::new(MetricsStore::new());

    if !topology.test_connection().await {
        tracing::warn!("Controller at {} is not reachable yet", cfg.controller_url());
    }

    // Start dashboard metrics poller
    let mut poller = MetricsPoller::new(
        topology.clone(),
        controller.clone(),
        metrics_store.clone(),
        cfg.metrics_poll_secs,
    );
    poller.start();

    // Create app state
    let state = Arc::new(AppState {
        config: cfg.clone(),
        topology,
        provisioner,
        metrics: metrics_store,
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("SDN provisioner listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.stop();
    tracing::info!("SDN provisioner shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
