use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::topology::SwitchRole;
use crate::AppState;

use super::{or_empty, ApiError};

/// Get all dashboard metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot().await)
}

/// Get statistics for one layer; unknown layers yield `{}`
pub async fn get_layer_metrics(
    State(state): State<Arc<AppState>>,
    Path(layer): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = match layer.parse::<SwitchRole>() {
        Ok(role) => state.metrics.layer(role).await,
        Err(_) => None,
    };
    or_empty(stats)
}

/// Get metrics for one switch
pub async fn get_switch_metrics(
    State(state): State<Arc<AppState>>,
    Path(switch_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    or_empty(state.metrics.switch(&switch_id).await)
}

/// Get metrics for the link from `source` to `target`
pub async fn get_link_metrics(
    State(state): State<Arc<AppState>>,
    Path((source, target)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let link_id = TopologyLink::new(source, target).id();
    or_empty(state.metrics.link(&link_id).await)
}
