//! Per-request log context
//!
//! Every request is handled inside a span carrying the application id, a
//! fresh event id and the caller's correlation id. A correlation id is
//! generated when the caller sends none, and it is echoed on the response.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::{config::Config, ids::EventId};

const DEFAULT_CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// State for [`LogContext::middleware`]
#[derive(Debug, Clone)]
pub struct LogContext {
    app_id: Arc<str>,
    correlation_id_header: HeaderName,
}

impl LogContext {
    pub fn new(app_id: impl Into<Arc<str>>, correlation_id_header: HeaderName) -> Self {
        Self {
            app_id: app_id.into(),
            correlation_id_header,
        }
    }

    /// Build from `telemetry.app_id` and the configured correlation header
    pub fn from_config(config: &Config) -> Self {
        let configured = &config.middleware.request_tracking.correlation_id_header;
        let header = HeaderName::try_from(configured.as_str()).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid correlation ID header '{}', using {}",
                configured,
                DEFAULT_CORRELATION_ID_HEADER
            );
            DEFAULT_CORRELATION_ID_HEADER
        });
        Self::new(config.telemetry.app_id.as_str(), header)
    }

    pub async fn middleware(
        State(context): State<Self>,
        mut request: Request,
        next: Next,
    ) -> Response {
        let header = &context.correlation_id_header;

        let supplied = request
            .headers()
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let correlation_id = match supplied {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&id) {
                    request.headers_mut().insert(header.clone(), value);
                }
                id
            }
        };

        let span = tracing::info_span!(
            "log_context",
            app_id = %context.app_id,
            event_id = %EventId::new(),
            correlation_id = %correlation_id,
        );

        let mut response = next.run(request).instrument(span).await;

        if let Ok(value) = HeaderValue::from_str(&correlation_id) {
            response.headers_mut().insert(header.clone(), value);
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        let context = LogContext::from_config(&Config::default());
        Router::new()
            .route(
                "/",
                get(|request: Request| async move {
                    request
                        .headers()
                        .get("x-correlation-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .layer(from_fn_with_state(context, LogContext::middleware))
    }

    #[tokio::test]
    async fn test_supplied_correlation_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-correlation-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-correlation-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_missing_correlation_id_is_generated() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let echoed = response.headers()["x-correlation-id"]
            .to_str()
            .unwrap()
            .to_string();
        assert!(Uuid::parse_str(&echoed).is_ok());

        // the handler saw the same id that was echoed
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, echoed.as_bytes());
    }
}
