//! Weather business rules between the handlers and the repository

use std::sync::Arc;

use forecast_core::outcome::Outcome;

use crate::models::{
    ForecastQuery, GetWeatherForecastRequest, GetWeatherForecastResponse, WeatherForecast,
};
use crate::repository::WeatherRepository;

/// Message returned when the repository reports a failure
pub const RETRIEVE_FAILED: &str = "Failed to retrieve Weather Forecast.";

/// Message returned when a listing fails
pub const LIST_FAILED: &str = "Failed to retrieve Weather Forecasts.";

#[derive(Clone)]
pub struct WeatherService {
    repository: Arc<dyn WeatherRepository>,
}

impl WeatherService {
    pub fn new(repository: Arc<dyn WeatherRepository>) -> Self {
        Self { repository }
    }

    /// Forecast for a day and location, stamped with the requested date
    ///
    /// Repository failures are logged and replaced with a generic message so
    /// warehouse details never reach the caller.
    pub async fn get_weather_forecast(
        &self,
        token: &str,
        request: &GetWeatherForecastRequest,
    ) -> Outcome<GetWeatherForecastResponse> {
        let outcome = self.repository.get_weather_forecast(token, request).await;

        match outcome {
            Outcome::Failure(message) => {
                tracing::error!("{}", message);
                Outcome::failure(RETRIEVE_FAILED)
            }
            Outcome::SuccessNull => {
                tracing::error!("Returned Weather Forecast was null.");
                Outcome::success_null()
            }
            Outcome::Success(forecast) => Outcome::success(GetWeatherForecastResponse {
                forecast,
                forecast_issue_date: request.date,
            }),
        }
    }

    /// Forecasts matching a validated listing query
    pub async fn list_weather_forecasts(
        &self,
        token: &str,
        query: &ForecastQuery,
    ) -> Outcome<Vec<WeatherForecast>> {
        let outcome = self.repository.list_weather_forecasts(token, query).await;

        match outcome {
            Outcome::Failure(message) => {
                tracing::error!("{}", message);
                Outcome::failure(LIST_FAILED)
            }
            Outcome::SuccessNull => {
                tracing::error!("Returned Weather Forecasts were null.");
                Outcome::success_null()
            }
            forecasts => forecasts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    /// Repository answering every call with a fixed outcome
    struct Fixed(Outcome<WeatherForecast>);

    #[async_trait]
    impl WeatherRepository for Fixed {
        async fn get_weather_forecast(
            &self,
            _token: &str,
            _request: &GetWeatherForecastRequest,
        ) -> Outcome<WeatherForecast> {
            self.0.clone()
        }

        async fn list_weather_forecasts(
            &self,
            _token: &str,
            _query: &ForecastQuery,
        ) -> Outcome<Vec<WeatherForecast>> {
            self.0.clone().map(|forecast| vec![forecast])
        }
    }

    fn forecast() -> WeatherForecast {
        WeatherForecast {
            cloud_coverage: "Sunny".into(),
            percent_to_rain: 0,
            temperature: 80,
        }
    }

    fn request() -> GetWeatherForecastRequest {
        GetWeatherForecastRequest {
            date: NaiveDate::from_ymd_opt(2026, 10, 16)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
            latitude: "1".into(),
            longitude: "2".into(),
        }
    }

    fn service(outcome: Outcome<WeatherForecast>) -> WeatherService {
        WeatherService::new(Arc::new(Fixed(outcome)))
    }

    #[tokio::test]
    async fn test_success_stamps_issue_date() {
        let outcome = service(Outcome::success(forecast()))
            .get_weather_forecast("t", &request())
            .await;
        assert_eq!(
            outcome,
            Outcome::success(GetWeatherForecastResponse {
                forecast: forecast(),
                forecast_issue_date: request().date,
            })
        );
    }

    #[tokio::test]
    async fn test_failure_message_is_replaced() {
        let outcome = service(Outcome::failure("connection refused"))
            .get_weather_forecast("t", &request())
            .await;
        assert_eq!(outcome.error_message(), Some(RETRIEVE_FAILED));
    }

    #[tokio::test]
    async fn test_null_is_forwarded() {
        let outcome = service(Outcome::success_null())
            .get_weather_forecast("t", &request())
            .await;
        assert!(outcome.is_null());
    }

    #[tokio::test]
    async fn test_list_failure_message_is_replaced() {
        let outcome = service(Outcome::failure("boom"))
            .list_weather_forecasts("t", &ForecastQuery::default())
            .await;
        assert_eq!(outcome.error_message(), Some(LIST_FAILED));
    }
}
