//! Health check handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Service version
    pub version: String,
}

impl HealthResponse {
    fn from_state(state: &AppState, status: &str) -> Self {
        Self {
            status: status.to_string(),
            service: state.config().service.name.clone(),
            version: state.config().service.version.clone(),
        }
    }
}

/// Liveness probe
///
/// Always returns 200 OK if the service is running.
#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/health",
        tag = "health",
        responses((status = 200, description = "Service is running", body = HealthResponse))
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::from_state(&state, "healthy")))
}

/// Readiness probe
///
/// The warehouse is queried per request with the caller's token, so there is
/// no pooled dependency to check; a missing warehouse section is reported as
/// degraded but still ready.
#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/ready",
        tag = "health",
        responses((status = 200, description = "Ready or degraded", body = HealthResponse))
    )
)]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.config().warehouse.is_some() {
        "ready"
    } else {
        tracing::debug!("Readiness: no warehouse configured");
        "degraded"
    };
    (StatusCode::OK, Json(HealthResponse::from_state(&state, status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn call(path: &str) -> (StatusCode, HealthResponse) {
        let mut config = Config::default();
        config.service.name = "weather-api".into();
        config.service.version = "v3".into();

        let app = Router::new()
            .route("/health", get(health))
            .route("/ready", get(readiness))
            .with_state(AppState::new(config));

        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "weather-api");
        assert_eq!(body.version, "v3");
    }

    #[tokio::test]
    async fn test_readiness_without_warehouse() {
        let (status, body) = call("/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "degraded");
    }
}
