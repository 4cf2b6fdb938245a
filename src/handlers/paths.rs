use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::flows::generate_rules;
use crate::models::*;
use crate::AppState;

use super::ApiError;

/// Ids end up as RESTCONF path segments and inside rule ids
fn is_valid_id(id: &str) -> bool {
    !id.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
}

fn validate_endpoints(source: &str, destination: &str) -> Result<(), ApiError> {
    if source.trim().is_empty() || destination.trim().is_empty() {
        return Err(ApiError::bad_request("source and destination are required"));
    }
    if let Some(bad) = [source, destination].into_iter().find(|id| !is_valid_id(id)) {
        return Err(ApiError::bad_request(format!("invalid endpoint id: {:?}", bad)));
    }
    Ok(())
}

fn validate_path(path: &[String]) -> Result<(), ApiError> {
    match path.iter().find(|id| id.is_empty() || !is_valid_id(id)) {
        Some(bad) => Err(ApiError::bad_request(format!("invalid switch id in path: {:?}", bad))),
        None => Ok(()),
    }
}

#[derive(Serialize)]
pub struct InstallPathResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct RedundantPathResponse {
    /// `[primary, backup]`
    pub success: (bool, bool),
}

/// Install a single path
pub async fn install_path(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InstallPathRequest>,
) -> Result<Json<InstallPathResponse>, ApiError> {
    validate_endpoints(&req.source, &req.destination)?;
    validate_path(&req.path)?;

    let success = state
        .provisioner
        .install_path(&req.source, &req.destination, &req.path, req.primary)
        .await;

    Ok(Json(InstallPathResponse { success }))
}

/// Configure a primary and a backup path between two endpoints
pub async fn install_redundant_path(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RedundantPathRequest>,
) -> Result<Json<RedundantPathResponse>, ApiError> {
    validate_endpoints(&req.source, &req.destination)?;
    validate_path(&req.primary_path)?;
    validate_path(&req.backup_path)?;

    let result = state
        .provisioner
        .install_redundant_path(&req.source, &req.destination, &req.primary_path, &req.backup_path)
        .await;

    state
        .metrics
        .record_path(PathRecord {
            source: req.source,
            destination: req.destination,
            primary_path: req.primary_path,
            backup_path: req.backup_path,
            primary_installed: result.primary,
            backup_installed: result.backup,
            provisioned_at: chrono::Utc::now(),
        })
        .await;

    Ok(Json(RedundantPathResponse {
        success: (result.primary, result.backup),
    }))
}

/// Show the rules a path would generate, without installing them
pub async fn preview_path(
    Json(req): Json<InstallPathRequest>,
) -> Result<Json<FlowRuleSet>, ApiError> {
    validate_endpoints(&req.source, &req.destination)?;
    validate_path(&req.path)?;
    Ok(Json(generate_rules(&req.source, &req.destination, &req.path, req.primary)))
}
