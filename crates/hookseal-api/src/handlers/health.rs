//! Health check handlers for service monitoring.
//!
//! The receiver has no external dependencies, so health reduces to whether
//! a signing secret is configured. Without one the service still answers
//! but can only verify deliveries signed with the empty key.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use hookseal_core::{Clock, DeliveryValidator};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks
    pub checks: HealthChecks,
    /// Service version information
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Serving, but with a configuration problem
    Degraded,
}

/// Individual component health check results.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    /// Signature validator configuration
    pub validator: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
    /// Signing scheme in use
    pub scheme: String,
    /// Optional explanation when not up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Component-level health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy
    Up,
    /// Component works with reduced guarantees
    Degraded,
}

/// Health service that encapsulates the clock for testable health checks.
pub struct HealthService {
    clock: Arc<dyn Clock>,
}

impl HealthService {
    /// Creates a new health service with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Reports the validator configuration.
    pub fn health_check(&self, validator: &DeliveryValidator) -> HealthResponse {
        debug!("Performing health check");

        let timestamp = DateTime::<Utc>::from(self.clock.now_system());

        let validator_health = if validator.has_secret() {
            ComponentHealth {
                status: ComponentStatus::Up,
                scheme: validator.scheme().to_string(),
                message: None,
            }
        } else {
            ComponentHealth {
                status: ComponentStatus::Degraded,
                scheme: validator.scheme().to_string(),
                message: Some("signing secret is empty".to_string()),
            }
        };

        let status = match validator_health.status {
            ComponentStatus::Up => HealthStatus::Healthy,
            ComponentStatus::Degraded => HealthStatus::Degraded,
        };

        HealthResponse {
            status,
            timestamp,
            checks: HealthChecks { validator: validator_health },
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check endpoint handler.
///
/// Degraded still answers 200: the process is serving requests.
#[instrument(name = "health_check", skip(app_state))]
pub async fn health_check(State(app_state): State<AppState>) -> Response {
    let health_service = HealthService::new(app_state.clock.clone());
    let response = health_service.health_check(&app_state.validator);

    debug!(
        status = ?response.status,
        validator_status = ?response.checks.validator.status,
        "Health check completed"
    );

    (StatusCode::OK, Json(response)).into_response()
}

/// Liveness check endpoint.
///
/// Returns a simple response indicating the service process is alive.
#[instrument(name = "liveness_check", skip(app_state))]
pub async fn liveness_check(State(app_state): State<AppState>) -> Response {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": DateTime::<Utc>::from(app_state.clock.now_system()),
        "service": "hookseal"
    });

    (StatusCode::OK, Json(response)).into_response()
}
