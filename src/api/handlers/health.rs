//! Liveness and readiness endpoints, shared by both services

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::storage::{check_connection, get_pool_stats, DbPool, PoolStats};

#[derive(Clone)]
pub struct HealthState {
    pub service: String,
    pub pool: DbPool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Readiness probe response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessResponse {
    pub status: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<PoolStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Returns 200 whenever the process is serving requests.
pub async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy".to_string(), service: state.service })
}

/// Returns 200 when storage answers, 503 with the storage error otherwise.
pub async fn ready_handler(
    State(state): State<HealthState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    match check_connection(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                service: state.service,
                connections: Some(get_pool_stats(&state.pool)),
                error: None,
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            let detail = std::error::Error::source(&err)
                .map(|source| source.to_string())
                .unwrap_or_else(|| err.to_string());
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready".to_string(),
                    service: state.service,
                    connections: None,
                    error: Some(detail),
                }),
            )
        }
    }
}
