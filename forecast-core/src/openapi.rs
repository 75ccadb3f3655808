//! OpenAPI documentation utilities
//!
//! Documents are generated with utoipa and served through Swagger UI. The
//! security schemes advertised in the document follow the configured
//! authentication flows:
//!
//! ```rust,ignore
//! use forecast_core::openapi::{OpenApiBuilder, SwaggerUI};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths(get_forecast))]
//! struct ApiDoc;
//!
//! let doc = OpenApiBuilder::new(ApiDoc::openapi())
//!     .info(&config.service)
//!     .security(&config.auth, &[("api://weather/.default", "Read forecasts")])?
//!     .bearer_auth()
//!     .build();
//!
//! let app = Router::new().merge(SwaggerUI::with_spec("/swagger-ui", doc));
//! ```

use axum::Router;
use utoipa::openapi::security::{
    AuthorizationCode, ClientCredentials, Flow, Implicit, OAuth2, Password, Scopes,
    SecurityRequirement, SecurityScheme,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{AuthConfig, AuthenticationType, ServiceConfig},
    error::{Error, Result},
};

/// Name of the OAuth2 security scheme
pub const OAUTH2_SCHEME: &str = "oauth2";

/// Name of the bearer JWT security scheme
pub const BEARER_SCHEME: &str = "bearer_auth";

/// Path the OpenAPI document is served from
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Builder for finishing a generated OpenAPI document
pub struct OpenApiBuilder {
    openapi: utoipa::openapi::OpenApi,
}

impl OpenApiBuilder {
    /// Create a new OpenAPI builder from an existing OpenApi instance
    pub fn new(openapi: utoipa::openapi::OpenApi) -> Self {
        Self { openapi }
    }

    /// Title and version from the service section
    pub fn info(mut self, service: &ServiceConfig) -> Self {
        self.openapi.info.title = service.name.clone();
        self.openapi.info.version = service.version.clone();
        self
    }

    /// Set the API description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.openapi.info.description = Some(description.into());
        self
    }

    /// Add a server URL
    pub fn server(mut self, url: impl Into<String>) -> Self {
        use utoipa::openapi::ServerBuilder;
        self.openapi
            .servers
            .get_or_insert_with(Vec::new)
            .push(ServerBuilder::new().url(url.into()).build());
        self
    }

    /// Add an `oauth2` scheme with one flow per configured flow type
    ///
    /// Fails when any OAuth flow is configured without complete `auth.oauth2`
    /// endpoints. With no OAuth flow configured the document is unchanged.
    pub fn security(mut self, auth: &AuthConfig, scopes: &[(&str, &str)]) -> Result<Self> {
        let wants_oauth = auth
            .flows
            .iter()
            .any(|flow| *flow != AuthenticationType::None);
        if !wants_oauth {
            return Ok(self);
        }

        let credentials = auth
            .oauth2
            .as_ref()
            .filter(|c| !c.authorization_endpoint.is_empty() && !c.token_endpoint.is_empty())
            .ok_or_else(|| {
                Error::Config(Box::new(figment::Error::from(
                    "OAuth2 configuration section is missing or incomplete".to_string(),
                )))
            })?;

        let scope_set = || scopes.iter().copied().collect::<Scopes>();
        let authorize = credentials.authorization_endpoint.as_str();
        let token = credentials.token_endpoint.as_str();

        let mut flows = Vec::new();
        if auth.allows(AuthenticationType::OauthPkce) {
            flows.push(Flow::AuthorizationCode(AuthorizationCode::new(
                authorize,
                token,
                scope_set(),
            )));
        }
        if auth.allows(AuthenticationType::OauthImplicit) {
            flows.push(Flow::Implicit(Implicit::new(authorize, scope_set())));
        }
        if auth.allows(AuthenticationType::OauthClientCredentials) {
            flows.push(Flow::ClientCredentials(ClientCredentials::new(token, scope_set())));
        }
        if auth.allows(AuthenticationType::OauthPassword) {
            flows.push(Flow::Password(Password::new(token, scope_set())));
        }

        self.add_scheme(
            OAUTH2_SCHEME,
            SecurityScheme::OAuth2(OAuth2::new(flows)),
            scopes.iter().map(|(scope, _)| scope.to_string()).collect(),
        );
        Ok(self)
    }

    /// Add a bearer JWT scheme
    pub fn bearer_auth(mut self) -> Self {
        self.add_scheme(BEARER_SCHEME, security::bearer_auth(), Vec::new());
        self
    }

    fn add_scheme(&mut self, name: &str, scheme: SecurityScheme, scopes: Vec<String>) {
        self.openapi
            .components
            .get_or_insert_with(Default::default)
            .add_security_scheme(name, scheme);
        self.openapi
            .security
            .get_or_insert_with(Vec::new)
            .push(SecurityRequirement::new(name, scopes));
    }

    /// Build the final OpenAPI specification
    pub fn build(self) -> utoipa::openapi::OpenApi {
        self.openapi
    }
}

/// Swagger UI integration for OpenAPI documentation
pub struct SwaggerUI;

impl SwaggerUI {
    /// Serve Swagger UI at `path` and the document at `/api-docs/openapi.json`
    pub fn with_spec(path: &'static str, openapi: utoipa::openapi::OpenApi) -> Router {
        SwaggerUi::new(path).url(OPENAPI_JSON_PATH, openapi).into()
    }
}

/// OpenAPI security scheme helpers
pub mod security {
    use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

    /// Create a Bearer token security scheme (for JWT)
    pub fn bearer_auth() -> SecurityScheme {
        SecurityScheme::Http(
            HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .build(),
        )
    }
}
