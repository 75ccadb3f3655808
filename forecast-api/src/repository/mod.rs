//! Weather data access
//!
//! Repositories answer with an [`Outcome`]; backend faults are folded into
//! [`Outcome::Failure`] before they reach the service layer.

pub mod warehouse;

use async_trait::async_trait;
use forecast_core::outcome::Outcome;

use crate::models::{ForecastQuery, GetWeatherForecastRequest, WeatherForecast};

pub use warehouse::WarehouseWeatherRepository;

/// Source of weather forecasts
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    /// Forecast for the requested day and location, queried with the caller's token
    async fn get_weather_forecast(
        &self,
        token: &str,
        request: &GetWeatherForecastRequest,
    ) -> Outcome<WeatherForecast>;

    /// Forecasts matching an already validated listing query
    async fn list_weather_forecasts(
        &self,
        token: &str,
        query: &ForecastQuery,
    ) -> Outcome<Vec<WeatherForecast>>;
}
