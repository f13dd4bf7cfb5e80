//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Automation
//! Builder API.

use axum::extract::State;
use axum::response::Json;

use crate::error::{ApiError, ErrorType};
use crate::models::{HealthStatus, ServiceInfo};
use crate::server::AppState;

pub mod connector_definitions;
pub mod user_connections;
pub mod workflows;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

/// Readiness check that verifies the database connection
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Service is ready", body = HealthStatus),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "health"
)]
pub async fn readyz(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    crate::db::health_check(&state.db).await.map_err(|err| {
        tracing::warn!(error = %err, "Readiness check failed");
        ApiError::from(ErrorType::ServiceUnavailable)
    })?;

    Ok(Json(HealthStatus::ok()))
}

/// Collects per-field validation failures before any store access.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(serde_json::Map<String, serde_json::Value>);

impl FieldErrors {
    pub(crate) fn require_non_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be blank");
        }
    }

    pub(crate) fn require_max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, &format!("must be at most {max} characters"));
        }
    }

    pub(crate) fn push(&mut self, field: &str, message: &str) {
        self.0.insert(
            field.to_string(),
            serde_json::Value::String(message.to_string()),
        );
    }

    pub(crate) fn into_result(self) -> Result<(), crate::error::ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(crate::error::validation_error(
                "Request validation failed",
                serde_json::Value::Object(self.0),
            ))
        }
    }
}
