//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: FORECAST_, nested keys split on `__`,
//!    e.g. `FORECAST_SERVICE__LOG_LEVEL=debug`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/forecast-service/{service_name}/config.toml
//! 4. System directory: /etc/forecast-service/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::warehouse::WarehouseCredentials;

const CONFIG_PREFIX: &str = "forecast-service";
const ENV_PREFIX: &str = "FORECAST_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Telemetry (log context and OTLP export)
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// JWT validation (optional; protected routes are open when unset)
    #[serde(default)]
    pub jwt: Option<JwtConfig>,

    /// Authentication flows advertised in the API document
    #[serde(default)]
    pub auth: AuthConfig,

    /// Data warehouse connection (optional)
    #[serde(default)]
    pub warehouse: Option<WarehouseCredentials>,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Application name
    pub name: String,

    /// Application version
    #[serde(default = "default_version")]
    pub version: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Path to public key for JWT verification
    pub public_key_path: PathBuf,

    /// JWT algorithm (RS256, ES256, HS256)
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,

    /// JWT issuer to validate
    #[serde(default)]
    pub issuer: Option<String>,

    /// JWT audience to validate
    #[serde(default)]
    pub audience: Option<String>,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Identifier attached to every request's log context
    #[serde(default)]
    pub app_id: String,

    /// OTLP collector endpoint, e.g. `http://localhost:4317`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Export spans to the collector
    #[serde(default)]
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            endpoint: None,
            enabled: false,
        }
    }
}

impl TelemetryConfig {
    /// Collector endpoint when export is switched on and configured
    pub fn export_endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .filter(|endpoint| self.enabled && !endpoint.trim().is_empty())
    }
}

/// OAuth flows a client may use against this API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationType {
    None,
    OauthPkce,
    OauthImplicit,
    OauthClientCredentials,
    OauthPassword,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Flows advertised in the OpenAPI security schemes
    #[serde(default)]
    pub flows: Vec<AuthenticationType>,

    /// Azure AD application registration
    #[serde(default)]
    pub azure_ad: Option<AzureAdConfig>,

    /// OAuth2 endpoints and client
    #[serde(default)]
    pub oauth2: Option<OAuth2Credentials>,
}

impl AuthConfig {
    pub fn allows(&self, flow: AuthenticationType) -> bool {
        self.flows.contains(&flow)
    }
}

/// Azure AD application registration
#[derive(Clone, Serialize, Deserialize)]
pub struct AzureAdConfig {
    pub instance: String,
    pub domain: String,
    pub tenant_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub audience: String,
}

impl fmt::Debug for AzureAdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureAdConfig")
            .field("instance", &self.instance)
            .field("domain", &self.domain)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("audience", &self.audience)
            .finish()
    }
}

/// OAuth2 endpoints and client credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuth2Credentials {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl fmt::Debug for OAuth2Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Credentials")
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request tracking configuration (request IDs, correlation IDs, header propagation)
    #[serde(default)]
    pub request_tracking: RequestTrackingConfig,

    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable panic recovery middleware
    #[serde(default = "default_true")]
    pub catch_panic: bool,

    /// Enable compression
    #[serde(default = "default_true")]
    pub compression: bool,

    /// CORS configuration
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            request_tracking: RequestTrackingConfig::default(),
            body_limit_mb: default_body_limit_mb(),
            catch_panic: true,
            compression: true,
            cors_mode: default_cors_mode(),
        }
    }
}

/// Request tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTrackingConfig {
    /// Enable request ID generation
    #[serde(default = "default_true")]
    pub request_id_enabled: bool,

    /// Request ID header name
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,

    /// Correlation ID header name
    #[serde(default = "default_correlation_id_header")]
    pub correlation_id_header: String,

    /// Enable header propagation
    #[serde(default = "default_true")]
    pub propagate_headers: bool,

    /// Enable sensitive header masking in logs
    #[serde(default = "default_true")]
    pub mask_sensitive_headers: bool,
}

impl Default for RequestTrackingConfig {
    fn default() -> Self {
        Self {
            request_id_enabled: true,
            request_id_header: default_request_id_header(),
            correlation_id_header: default_correlation_id_header(),
            propagate_headers: true,
            mask_sensitive_headers: true,
        }
    }
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_jwt_algorithm() -> String {
    "RS256".to_string()
}

fn default_true() -> bool {
    true
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_request_id_header() -> String {
    "x-request-id".to_string()
}

fn default_correlation_id_header() -> String {
    "x-correlation-id".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is taken from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| CONFIG_PREFIX.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // lowest priority first so later files override earlier ones
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the XDG and system directories.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Candidate config files, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_PREFIX);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_PREFIX)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }

    /// Bind address for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.service.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: CONFIG_PREFIX.to_string(),
                version: default_version(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            middleware: MiddlewareConfig::default(),
            telemetry: TelemetryConfig::default(),
            jwt: None,
            auth: AuthConfig::default(),
            warehouse: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.middleware.cors_mode, "permissive");
        assert_eq!(
            config.middleware.request_tracking.correlation_id_header,
            "x-correlation-id"
        );
        assert!(config.jwt.is_none());
        assert!(config.telemetry.export_endpoint().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "weather-api"
version = "v2"
port = 9090

[telemetry]
app_id = "weather"
endpoint = "http://collector:4317"
enabled = true

[auth]
flows = ["oauth_pkce", "oauth_client_credentials"]

[auth.oauth2]
authorization_endpoint = "https://login.example.com/authorize"
token_endpoint = "https://login.example.com/token"
client_id = "abc"
client_secret = "shh"

[warehouse]
schema = "WEATHER"
database = "FORECASTS"
warehouse = "COMPUTE_WH"
role = "READER"
account = "acct"
host = "acct.example.com"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "weather-api");
        assert_eq!(config.service.version, "v2");
        assert_eq!(config.service.port, 9090);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.telemetry.export_endpoint(), Some("http://collector:4317"));
        assert!(config.auth.allows(AuthenticationType::OauthPkce));
        assert!(!config.auth.allows(AuthenticationType::OauthPassword));
        assert_eq!(config.warehouse.as_ref().map(|w| w.role.as_str()), Some("READER"));
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let credentials = OAuth2Credentials {
            authorization_endpoint: "a".into(),
            token_endpoint: "t".into(),
            client_id: "id".into(),
            client_secret: "hunter2".into(),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn test_export_requires_enabled_flag() {
        let telemetry = TelemetryConfig {
            app_id: "x".into(),
            endpoint: Some("http://collector:4317".into()),
            enabled: false,
        };
        assert!(telemetry.export_endpoint().is_none());
    }
}
