pub mod metrics;
pub mod paths;
pub mod topology;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::controller::ControllerError;
use crate::AppState;

/// Error response - {"error": "message"}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(ce) = err.downcast_ref::<ControllerError>() {
            return Self::bad_gateway(ce.to_string());
        }
        Self::internal(err.to_string())
    }
}

/// Serialize `item`, or `{}` when absent
pub fn or_empty<T: Serialize>(item: Option<T>) -> Result<Json<serde_json::Value>, ApiError> {
    match item {
        Some(item) => serde_json::to_value(item)
            .map(Json)
            .map_err(|e| ApiError::internal(e.to_string())),
        None => Ok(Json(serde_json::json!({}))),
    }
}

/// Healthcheck endpoint, including controller reachability
pub async fn healthcheck(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let controller = state.topology.test_connection().await;
    Json(serde_json::json!({
        "status": "ok",
        "service": "sdn-provisioner",
        "controller": state.config.controller_url(),
        "controller_connected": controller,
        "topology_age_secs": state.topology.age().await.map(|d| d.as_secs()),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
