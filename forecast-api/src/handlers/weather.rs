//! Weather endpoints

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use forecast_core::{error::Error, middleware::bearer_token, outcome::HttpOutcome};

use crate::{
    models::{
        GetWeatherForecastRequest, GetWeatherForecastResponse, ListForecastsParams,
        WeatherForecast,
    },
    ApiState,
};

/// Warehouse token used by the anonymous forecast endpoint
pub const DEMO_TOKEN: &str = "TestTokenToPassDemo";

pub const FORECAST_NOT_FOUND: &str = "No Weather Forecast could be found.";

pub const FORECASTS_NOT_FOUND: &str = "No Weather Forecasts could be found.";

/// Get the forecast for a day and location
#[utoipa::path(
    post,
    path = "/weather/forecast",
    tag = "weather",
    request_body = GetWeatherForecastRequest,
    security(()),
    responses(
        (status = 200, description = "Forecast found", body = GetWeatherForecastResponse),
        (status = 404, description = "No forecast for the request", body = String),
        (status = 500, description = "Forecast could not be retrieved", body = String)
    )
)]
pub async fn get_weather_forecast(
    State(state): State<ApiState>,
    Json(request): Json<GetWeatherForecastRequest>,
) -> HttpOutcome<GetWeatherForecastResponse> {
    let outcome = state.weather.get_weather_forecast(DEMO_TOKEN, &request).await;

    if let Some(message) = outcome.error_message() {
        tracing::error!("{}", message);
    }

    HttpOutcome::from_outcome(outcome, FORECAST_NOT_FOUND)
}

/// List forecasts with filtering, sorting and paging
///
/// The caller's bearer token is forwarded to the warehouse.
#[utoipa::path(
    get,
    path = "/weather/forecasts",
    tag = "weather",
    params(ListForecastsParams),
    responses(
        (status = 200, description = "Matching forecasts", body = Vec<WeatherForecast>),
        (status = 400, description = "Filter, sort or paging was rejected", body = forecast_core::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = forecast_core::error::ErrorResponse),
        (status = 500, description = "Forecasts could not be retrieved", body = String)
    )
)]
pub async fn list_weather_forecasts(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(params): Query<ListForecastsParams>,
) -> Result<HttpOutcome<Vec<WeatherForecast>>, Error> {
    let query = params.validate(&state.descriptor)?;
    tracing::debug!(
        filters = query.filter.items().len(),
        sorts = query.sort.items().len(),
        offset = query.paging.offset,
        limit = query.paging.limit,
        "Listing weather forecasts"
    );

    let token = bearer_token(&headers);
    let outcome = state.weather.list_weather_forecasts(&token, &query).await;

    Ok(HttpOutcome::from_outcome(outcome, FORECASTS_NOT_FOUND))
}
