//! OpenAPI document for the weather API

use forecast_core::{
    config::Config,
    diagnostics,
    error::{ErrorResponse, Result},
    health::{self, HealthResponse},
    openapi::OpenApiBuilder,
};
use utoipa::OpenApi;

use crate::handlers::weather;
use crate::models::{GetWeatherForecastRequest, GetWeatherForecastResponse, WeatherForecast};

/// Scopes advertised on the OAuth2 scheme
pub const SCOPES: &[(&str, &str)] = &[("api://weather/.default", "Read weather forecasts")];

#[derive(OpenApi)]
#[openapi(
    paths(
        weather::get_weather_forecast,
        weather::list_weather_forecasts,
        diagnostics::echo,
        diagnostics::test_log,
        diagnostics::document::openapi_document,
        health::health,
        health::readiness,
    ),
    components(schemas(
        WeatherForecast,
        GetWeatherForecastRequest,
        GetWeatherForecastResponse,
        ErrorResponse,
        HealthResponse,
    )),
    tags(
        (name = "weather", description = "Weather forecasts"),
        (name = "diagnostics", description = "Connectivity and logging checks"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Finished document with service info and configured security schemes
pub fn api_doc(config: &Config) -> Result<utoipa::openapi::OpenApi> {
    let builder = OpenApiBuilder::new(ApiDoc::openapi())
        .info(&config.service)
        .description("Weather forecasts served from the data warehouse")
        .security(&config.auth, SCOPES)?;

    let builder = if config.jwt.is_some() {
        builder.bearer_auth()
    } else {
        builder
    };

    Ok(builder.build())
}
