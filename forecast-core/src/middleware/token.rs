//! Bearer token extraction and claims

use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Claims carried by access tokens issued to callers of this API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or client object ID)
    #[serde(default)]
    pub sub: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Sign-in name, usually an email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// App roles granted to the caller
    #[serde(default)]
    pub roles: Vec<String>,

    /// Space separated delegated scopes
    #[serde(rename = "scp", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Token format version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Check if the token has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Delegated scopes as individual entries
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().any(|s| s == scope)
    }
}

/// Token validator trait
pub trait TokenValidator: Send + Sync + Clone {
    /// Validate a token and extract claims
    fn validate_token(&self, token: &str) -> Result<Claims, Error>;
}

/// Extract token from Authorization header (Bearer scheme)
pub fn extract_token(headers: &HeaderMap) -> Result<String, Error> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("Missing Authorization header".to_string()))?;

    match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim().to_string())
        }
        _ => Err(Error::Unauthorized(
            "Invalid Authorization header format".to_string(),
        )),
    }
}

/// Bearer token from the request, or an empty string when absent or malformed
///
/// Failures are logged rather than returned; callers decide whether an empty
/// token is acceptable.
pub fn bearer_token(headers: &HeaderMap) -> String {
    match extract_token(headers) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Unable to read bearer token: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_token(&headers("bearer abc")).unwrap(), "abc");
        assert!(extract_token(&headers("Basic dXNlcjpwdw==")).is_err());
        assert!(extract_token(&headers("Bearer ")).is_err());
        assert!(extract_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_bearer_token_is_empty_on_failure() {
        assert_eq!(bearer_token(&HeaderMap::new()), "");
        assert_eq!(bearer_token(&headers("Token xyz")), "");
        assert_eq!(bearer_token(&headers("Bearer xyz")), "xyz");
    }

    #[test]
    fn test_claims_roles_and_scopes() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "00000000-0000-0000-0000-000000000001",
            "name": "Forecast Reader",
            "roles": ["Weather.Read"],
            "scp": "forecast.read forecast.list",
            "ver": "2.0"
        }))
        .unwrap();

        assert!(claims.has_role("Weather.Read"));
        assert!(!claims.has_role("Weather.Write"));
        assert!(claims.has_scope("forecast.list"));
        assert_eq!(claims.scopes().count(), 2);
        assert!(claims.exp.is_none());
    }
}
