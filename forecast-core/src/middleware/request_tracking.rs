//! Request ID generation, propagation and sensitive header masking

use http::HeaderName;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::{config::RequestTrackingConfig, ids::MakeTypedRequestId};

const DEFAULT_REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Sensitive headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Configured request ID header, falling back to `x-request-id` when invalid
pub fn request_id_header(config: &RequestTrackingConfig) -> HeaderName {
    HeaderName::try_from(config.request_id_header.as_str()).unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid request ID header '{}', using {}",
            config.request_id_header,
            DEFAULT_REQUEST_ID_HEADER
        );
        DEFAULT_REQUEST_ID_HEADER
    })
}

/// Set a `req_…` ID on requests that arrive without one
pub fn request_id_layer(config: &RequestTrackingConfig) -> SetRequestIdLayer<MakeTypedRequestId> {
    SetRequestIdLayer::new(request_id_header(config), MakeTypedRequestId)
}

/// Copy the request ID onto the response
pub fn request_id_propagation_layer(config: &RequestTrackingConfig) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(request_id_header(config))
}

/// Mark credentials as sensitive so trace output redacts them
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    let headers = SENSITIVE_HEADERS
        .iter()
        .filter_map(|name| HeaderName::try_from(*name).ok())
        .collect::<Vec<_>>();

    SetSensitiveRequestHeadersLayer::new(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_header_from_config() {
        let mut config = RequestTrackingConfig::default();
        assert_eq!(request_id_header(&config), "x-request-id");

        config.request_id_header = "x-trace-request".into();
        assert_eq!(request_id_header(&config), "x-trace-request");

        config.request_id_header = "not a header".into();
        assert_eq!(request_id_header(&config), DEFAULT_REQUEST_ID_HEADER);
    }

    #[test]
    fn test_sensitive_headers() {
        assert!(SENSITIVE_HEADERS.contains(&"authorization"));
        assert!(SENSITIVE_HEADERS.contains(&"x-api-key"));
        for name in SENSITIVE_HEADERS {
            assert!(HeaderName::try_from(*name).is_ok(), "{name}");
        }
    }
}
