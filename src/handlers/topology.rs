use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::*;
use crate::topology::reference_topology;
use crate::AppState;

use super::ApiError;

/// Get the current topology grouped by layer
pub async fn get_topology(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LayeredTopology>, ApiError> {
    let snapshot = state.topology.get_topology(false).await?;
    Ok(Json(LayeredTopology::from(snapshot.as_ref())))
}

/// Get the reference three-tier lab topology
pub async fn get_reference_topology() -> Json<LayeredTopology> {
    Json(LayeredTopology::from(&reference_topology()))
}
