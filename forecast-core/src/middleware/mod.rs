//! Middleware for request tracking, log context and bearer authentication

// Bearer extraction and claims (always available)
pub mod token;

// JWT authentication (requires jwt feature)
#[cfg(feature = "jwt")]
pub mod jwt;

pub mod log_context;
pub mod request_tracking;

pub use token::{bearer_token, extract_token, Claims, TokenValidator};

#[cfg(feature = "jwt")]
pub use jwt::{read_claims, JwtAuth};

pub use log_context::LogContext;
pub use request_tracking::{
    request_id_header, request_id_layer, request_id_propagation_layer, sensitive_headers_layer,
    SENSITIVE_HEADERS,
};
