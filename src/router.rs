use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    api_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Topology routes
        .route("/api/topology", get(handlers::topology::get_topology))
        .route("/api/topology/reference", get(handlers::topology::get_reference_topology))
        // Metrics routes
        .route("/api/metrics", get(handlers::metrics::get_metrics))
        .route("/api/layer/:layer", get(handlers::metrics::get_layer_metrics))
        .route("/api/switch/:switch_id", get(handlers::metrics::get_switch_metrics))
        .route("/api/link/:source/:target", get(handlers::metrics::get_link_metrics))
        // Path provisioning routes
        .route("/api/path", post(handlers::paths::install_path))
        .route("/api/path/redundant", post(handlers::paths::install_redundant_path))
        .route("/api/path/preview", post(handlers::paths::preview_path))
}
