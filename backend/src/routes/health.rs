//! Health check endpoints
//!
//! - /health - basic health check
//! - /health/ready - readiness check against the database
//! - /health/live - liveness check

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const SERVICE_NAME: &str = "coaching-platform";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    fn new(status: &'static str, checks: Option<HealthChecks>) -> Self {
        Self {
            status,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", None))
}

/// Readiness check; 503 while the database is unreachable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = match db::ping(state.db()).await {
        Ok(()) => CheckStatus {
            healthy: true,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            CheckStatus {
                healthy: false,
                message: Some(e.to_string()),
            }
        }
    };

    if database.healthy {
        Ok(Json(HealthResponse::new(
            "ready",
            Some(HealthChecks { database }),
        )))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("not_ready", Some(HealthChecks { database }))),
        ))
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive", None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_returns_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, SERVICE_NAME);
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_check_returns_alive() {
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
        assert!(response.checks.is_none());
    }
}
