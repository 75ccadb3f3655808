//! # forecast-core
//!
//! Shared building blocks for warehouse-backed forecast APIs.
//!
//! ## Features
//!
//! - **Result envelope**: [`outcome::Outcome`] distinguishes success, a
//!   successful empty answer and failure, and maps onto HTTP responses
//! - **Query translation**: `?filter=`, `?sort=` and paging validated against
//!   a static entity descriptor and appended to parameterised SQL
//! - **Middleware stack**: request IDs, per-request log context, JWT auth,
//!   panic recovery, body size limits
//! - **Observability**: JSON logs with optional OpenTelemetry span export
//! - **Diagnostics**: echo, test-log and OpenAPI document download
//! - **Graceful shutdown**: Proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use forecast_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let app = Router::new()
//!         .route("/health", get(health))
//!         .route("/ready", get(readiness))
//!         .merge(diagnostics::routes())
//!         .with_state(AppState::new(config.clone()));
//!
//!     Server::new(config).serve(app).await?;
//!     shutdown_tracing();
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod observability;
pub mod outcome;
pub mod query;
pub mod responses;
pub mod server;
pub mod state;
pub mod warehouse;

#[cfg(feature = "openapi")]
pub mod openapi;

pub mod prelude {
    pub use crate::config::{AuthenticationType, Config};
    pub use crate::diagnostics;
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::health::{health, readiness};
    pub use crate::ids::{EventId, MakeTypedRequestId, RequestId};
    pub use crate::middleware::{bearer_token, Claims, LogContext, TokenValidator};

    #[cfg(feature = "jwt")]
    pub use crate::middleware::JwtAuth;

    pub use crate::observability::{init_tracing, shutdown_tracing};
    pub use crate::outcome::{HttpOutcome, Outcome};
    pub use crate::query::{
        Base, EntityDescriptor, Field, FieldKind, OffsetLimit, QueryError, ValidatedFilter,
        ValidatedSort,
    };
    pub use crate::responses::FileDownload;
    pub use crate::server::Server;
    pub use crate::state::AppState;
    pub use crate::warehouse::WarehouseCredentials;

    #[cfg(feature = "openapi")]
    pub use crate::openapi::{OpenApiBuilder, SwaggerUI};

    pub use axum::{
        extract::{FromRef, Json, Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
        Router,
    };
    pub use serde::{Deserialize, Serialize};
}
