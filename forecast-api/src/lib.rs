//! # forecast-api
//!
//! Weather forecast HTTP API. Forecasts are read from the data warehouse with
//! the caller's token and returned through the [`Outcome`] envelope.
//!
//! [`Outcome`]: forecast_core::outcome::Outcome

pub mod descriptor;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use forecast_core::{
    config::Config,
    diagnostics,
    error::Result,
    health::{health, readiness},
    middleware::JwtAuth,
    openapi::SwaggerUI,
    query::EntityDescriptor,
    state::AppState,
};

use crate::{
    descriptor::weather_descriptor,
    repository::{WarehouseWeatherRepository, WeatherRepository},
    services::WeatherService,
};

/// Shared application state
#[derive(Clone)]
pub struct ApiState {
    pub core: AppState,
    pub weather: WeatherService,
    pub descriptor: Arc<EntityDescriptor>,
}

impl ApiState {
    /// State backed by the configured warehouse
    ///
    /// Fails when the weather descriptor does not register.
    pub fn new(config: Config) -> Result<Self> {
        let repository = WarehouseWeatherRepository::new(config.warehouse.clone());
        Self::with_repository(config, Arc::new(repository))
    }

    /// State backed by an arbitrary repository
    pub fn with_repository(config: Config, repository: Arc<dyn WeatherRepository>) -> Result<Self> {
        let descriptor = weather_descriptor()?;
        tracing::debug!(
            entity = descriptor.entity(),
            fields = descriptor.fields().len(),
            "Registered entity descriptor"
        );

        Ok(Self {
            core: AppState::new(config),
            weather: WeatherService::new(repository),
            descriptor: Arc::new(descriptor),
        })
    }

    pub fn config(&self) -> &Config {
        self.core.config()
    }
}

impl FromRef<ApiState> for AppState {
    fn from_ref(state: &ApiState) -> Self {
        state.core.clone()
    }
}

/// All routes, with JWT required on the listing when `jwt` is configured
pub fn router(state: ApiState) -> Result<Router> {
    let doc = openapi::api_doc(state.config())?;

    let mut listing =
        Router::new().route("/weather/forecasts", get(handlers::list_weather_forecasts));
    if let Some(jwt) = &state.config().jwt {
        let auth = JwtAuth::new(jwt)?;
        listing = listing.route_layer(from_fn_with_state(auth, JwtAuth::middleware));
    }

    let app = Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .route("/weather/forecast", post(handlers::get_weather_forecast))
        .merge(listing)
        .merge(diagnostics::routes())
        .merge(diagnostics::openapi_routes(doc.clone()))
        .with_state(state)
        .merge(SwaggerUI::with_spec("/swagger-ui", doc));

    Ok(app)
}
