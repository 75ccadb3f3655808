//! Diagnostic routes: connectivity echo, log emission test, document download

use axum::{
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};

use crate::middleware::bearer_token;

/// Connectivity test
#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/diagnostics/echo",
        tag = "diagnostics",
        responses((status = 200, description = "The API is live", body = String))
    )
)]
pub async fn echo() -> &'static str {
    tracing::info!("Diagnostic Echo");
    "Echo Successful"
}

/// Emit one log line per level, tagged with the caller's token
#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/diagnostics/test-log",
        tag = "diagnostics",
        responses((status = 200, description = "Test log lines were written"))
    )
)]
pub async fn test_log(headers: HeaderMap) -> StatusCode {
    let token = bearer_token(&headers);
    log_captured_token(&token);

    tracing::info!("Information - Test");
    tracing::warn!("Warning - Test");
    tracing::error!("Error - Test");

    StatusCode::OK
}

#[cfg(feature = "jwt")]
fn log_captured_token(token: &str) {
    if token.is_empty() {
        tracing::info!("Diagnostics captured no bearer token");
        return;
    }
    match crate::middleware::read_claims(token) {
        Ok(claims) => tracing::info!(
            sub = %claims.sub,
            name = claims.name.as_deref().unwrap_or_default(),
            roles = ?claims.roles,
            "Diagnostics captured a bearer token"
        ),
        Err(e) => tracing::warn!("Diagnostics captured an unreadable bearer token: {}", e),
    }
}

#[cfg(not(feature = "jwt"))]
fn log_captured_token(token: &str) {
    tracing::info!(
        captured = !token.is_empty(),
        length = token.len(),
        "Diagnostics bearer token check"
    );
}

/// Echo and test-log routes
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/diagnostics/echo", get(echo))
        .route("/diagnostics/test-log", get(test_log))
}

#[cfg(feature = "openapi")]
pub use document::{openapi_document, openapi_routes};

/// OpenAPI document download (requires `openapi` feature)
#[cfg(feature = "openapi")]
pub mod document {
    use axum::{
        extract::{FromRef, State},
        routing::get,
        Extension, Router,
    };
    use std::sync::Arc;
    use utoipa::openapi::OpenApi;

    use crate::{error::Error, responses::FileDownload, state::AppState};

    /// File name for a document download, e.g. `weather-api OpenApi3 2026-10-16 3:04:05 PM.json`
    pub(crate) fn download_name(app_name: &str, now: chrono::DateTime<chrono::Local>) -> String {
        format!("{app_name} OpenApi3 {}.json", now.format("%Y-%m-%d %-I:%M:%S %p"))
    }

    /// Download the OpenAPI 3 document as a JSON attachment
    #[utoipa::path(
        get,
        path = "/diagnostics/openapi",
        tag = "diagnostics",
        responses((status = 200, description = "OpenAPI 3 document", content_type = "application/json"))
    )]
    pub async fn openapi_document(
        State(state): State<AppState>,
        Extension(doc): Extension<Arc<OpenApi>>,
    ) -> Result<FileDownload, Error> {
        let json = doc
            .to_pretty_json()
            .map_err(|e| Error::Internal(format!("failed to render OpenAPI document: {e}")))?;

        Ok(FileDownload::json(
            download_name(&state.config().service.name, chrono::Local::now()),
            json.into_bytes(),
        ))
    }

    /// Document download route
    pub fn openapi_routes<S>(doc: OpenApi) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
        AppState: FromRef<S>,
    {
        Router::new()
            .route("/diagnostics/openapi", get(openapi_document))
            .layer(Extension(Arc::new(doc)))
    }
}
