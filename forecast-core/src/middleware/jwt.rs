//! JWT authentication middleware (requires `jwt` feature)

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::{fs, sync::Arc};

use super::token::{extract_token, Claims, TokenValidator};
use crate::{config::JwtConfig, error::Error};

/// Paths served without a token
const PUBLIC_PATHS: &[&str] = &["/health", "/ready"];

/// JWT authentication middleware state
#[derive(Clone)]
pub struct JwtAuth {
    decoding_key: Arc<DecodingKey>,
    validation: Validation,
}

fn config_error(message: String) -> Error {
    Error::Config(Box::new(figment::Error::from(message)))
}

impl JwtAuth {
    /// Create a new JWT authentication middleware
    pub fn new(config: &JwtConfig) -> Result<Self, Error> {
        let public_key = fs::read(&config.public_key_path).map_err(|e| {
            config_error(format!(
                "Failed to read JWT public key from path '{}': {}",
                config.public_key_path.display(),
                e
            ))
        })?;

        let algorithm = match config.algorithm.to_uppercase().as_str() {
            "RS256" => Algorithm::RS256,
            "RS384" => Algorithm::RS384,
            "RS512" => Algorithm::RS512,
            "ES256" => Algorithm::ES256,
            "ES384" => Algorithm::ES384,
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            alg => return Err(config_error(format!("Unsupported JWT algorithm: {}", alg))),
        };

        let decoding_key = match algorithm {
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => {
                DecodingKey::from_rsa_pem(&public_key)?
            }
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(&public_key)?,
            _ => DecodingKey::from_secret(&public_key),
        };

        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &config.audience {
            validation.set_audience(&[audience]);
        }

        Ok(Self {
            decoding_key: Arc::new(decoding_key),
            validation,
        })
    }

    /// Middleware function to validate JWT and inject claims
    pub async fn middleware(
        State(auth): State<Self>,
        mut request: Request<Body>,
        next: Next,
    ) -> Result<Response, Error> {
        if PUBLIC_PATHS.contains(&request.uri().path()) {
            return Ok(next.run(request).await);
        }

        let token = extract_token(request.headers())?;
        let claims = auth.validate_token(&token).inspect_err(|e| {
            tracing::warn!("Rejected bearer token: {}", e);
        })?;

        request.extensions_mut().insert(claims);

        Ok(next.run(request).await)
    }
}

impl TokenValidator for JwtAuth {
    fn validate_token(&self, token: &str) -> Result<Claims, Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

/// Read a token's claims without checking its signature or expiry
///
/// For diagnostics only; never use the result for authorization.
pub fn read_claims(token: &str) -> Result<Claims, Error> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<Claims>(token)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::io::Write;

    const SECRET: &[u8] = b"forecast-test-secret";

    fn hs256_config() -> (tempfile::NamedTempFile, JwtConfig) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SECRET).unwrap();
        let config = JwtConfig {
            public_key_path: file.path().to_path_buf(),
            algorithm: "HS256".into(),
            issuer: Some("https://login.example.com".into()),
            audience: None,
        };
        (file, config)
    }

    fn token(claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn claims() -> Claims {
        Claims {
            sub: "reader".into(),
            name: Some("Forecast Reader".into()),
            roles: vec!["Weather.Read".into()],
            exp: Some(chrono::Utc::now().timestamp() + 600),
            iss: Some("https://login.example.com".into()),
            ..Claims::default()
        }
    }

    #[test]
    fn test_validate_token() {
        let (_file, config) = hs256_config();
        let auth = JwtAuth::new(&config).unwrap();

        let validated = auth.validate_token(&token(&claims())).unwrap();
        assert_eq!(validated, claims());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let (_file, config) = hs256_config();
        let auth = JwtAuth::new(&config).unwrap();

        let mut foreign = claims();
        foreign.iss = Some("https://elsewhere.example.com".into());
        assert!(matches!(
            auth.validate_token(&token(&foreign)),
            Err(Error::Jwt(_))
        ));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let (_file, mut config) = hs256_config();
        config.algorithm = "none".into();
        assert!(matches!(JwtAuth::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_read_claims_ignores_signature_and_expiry() {
        let mut expired = claims();
        expired.exp = Some(1);
        let encoded = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret(b"some other key"),
        )
        .unwrap();

        let read = read_claims(&encoded).unwrap();
        assert_eq!(read.name.as_deref(), Some("Forecast Reader"));
        assert!(read_claims("not-a-token").is_err());
    }
}
