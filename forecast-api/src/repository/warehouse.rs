//! Warehouse-backed weather repository
//!
//! The warehouse driver is not wired in yet. Commands are built and logged
//! exactly as they would be sent, and answers come from a fixed sample set.

use std::cmp::Ordering;

use anyhow::{Context, Result};
use async_trait::async_trait;
use forecast_core::{
    outcome::Outcome,
    query::{Base, Command, FilterValue, SortOrder, ValidatedFilter, ValidatedSort},
    warehouse::WarehouseCredentials,
};

use super::WeatherRepository;
use crate::models::{ForecastQuery, GetWeatherForecastRequest, WeatherForecast};

const GET_WEATHER_FORECAST_SQL: &str = include_str!("../../sql/get_weather_forecast.sql");
const LIST_WEATHER_FORECASTS_SQL: &str = include_str!("../../sql/list_weather_forecasts.sql");

/// Weather repository reading from the `warehouse` configuration section
#[derive(Debug, Clone)]
pub struct WarehouseWeatherRepository {
    credentials: Option<WarehouseCredentials>,
    samples: Vec<WeatherForecast>,
}

impl WarehouseWeatherRepository {
    pub fn new(credentials: Option<WarehouseCredentials>) -> Self {
        Self {
            credentials,
            samples: sample_forecasts(),
        }
    }

    /// Replace the rows the listing answers from
    pub fn with_samples(mut self, samples: Vec<WeatherForecast>) -> Self {
        self.samples = samples;
        self
    }

    fn connect(&self, token: &str) -> Result<String> {
        let credentials = self
            .credentials
            .as_ref()
            .context("warehouse section is not configured")?;
        let connection = credentials.token_connection_string(token);
        tracing::info!(
            database = %credentials.database,
            warehouse = %credentials.warehouse,
            "Opening warehouse connection"
        );
        Ok(connection)
    }

    async fn fetch_forecast(
        &self,
        token: &str,
        request: &GetWeatherForecastRequest,
    ) -> Result<WeatherForecast> {
        let _connection = self.connect(token)?;
        let command = forecast_command(request);
        log_command(&command, "Querying weather forecast");

        Ok(WeatherForecast {
            cloud_coverage: "Partly Cloudy".to_string(),
            percent_to_rain: 40,
            temperature: 63,
        })
    }

    async fn fetch_forecasts(&self, token: &str, query: &ForecastQuery) -> Result<Vec<WeatherForecast>> {
        let _connection = self.connect(token)?;
        let command = Base::new(LIST_WEATHER_FORECASTS_SQL)
            .filter(&query.filter)
            .sort(&query.sort)
            .page(query.paging)
            .build();
        log_command(&command, "Querying weather forecasts");

        let mut rows: Vec<WeatherForecast> = self
            .samples
            .iter()
            .filter(|row| matches_filter(row, &query.filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, &query.sort));

        Ok(query.paging.window(rows).collect())
    }
}

impl Default for WarehouseWeatherRepository {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl WeatherRepository for WarehouseWeatherRepository {
    async fn get_weather_forecast(
        &self,
        token: &str,
        request: &GetWeatherForecastRequest,
    ) -> Outcome<WeatherForecast> {
        let outcome = Outcome::capture_value(
            self.fetch_forecast(token, request),
            "Failed to query the weather warehouse.",
        )
        .await;
        if let Some(message) = outcome.error_message() {
            tracing::error!("{}", message);
        }
        outcome
    }

    async fn list_weather_forecasts(
        &self,
        token: &str,
        query: &ForecastQuery,
    ) -> Outcome<Vec<WeatherForecast>> {
        let outcome = Outcome::capture_value(
            self.fetch_forecasts(token, query),
            "Failed to query the weather warehouse.",
        )
        .await;
        if let Some(message) = outcome.error_message() {
            tracing::error!("{}", message);
        }
        outcome
    }
}

fn forecast_command(request: &GetWeatherForecastRequest) -> Command {
    Base::new(GET_WEATHER_FORECAST_SQL)
        .bind("IssueDate", request.date)
        .bind("Latitude", request.latitude.as_str())
        .bind("Longitude", request.longitude.as_str())
        .build()
}

fn log_command(command: &Command, message: &str) {
    let parameters: Vec<String> = command
        .parameters()
        .iter()
        .map(|p| format!("{}={} ({:?})", p.name, p.value, p.db_type()))
        .collect();
    tracing::debug!(sql = %command.text(), parameters = ?parameters, "{}", message);
}

fn matches_filter(row: &WeatherForecast, filter: &ValidatedFilter) -> bool {
    filter.items().iter().all(|item| {
        match (row.column_value(&item.column), &item.value) {
            // string equality follows the warehouse's case-insensitive collation
            (Some(FilterValue::Str(have)), FilterValue::Str(want)) => have.eq_ignore_ascii_case(want),
            (Some(have), want) => have == *want,
            (None, _) => false,
        }
    })
}

fn compare_rows(a: &WeatherForecast, b: &WeatherForecast, sort: &ValidatedSort) -> Ordering {
    sort.items()
        .iter()
        .map(|item| {
            let ordering = compare_values(a.column_value(&item.column), b.column_value(&item.column));
            match item.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_values(a: Option<FilterValue>, b: Option<FilterValue>) -> Ordering {
    match (a, b) {
        (Some(FilterValue::Str(a)), Some(FilterValue::Str(b))) => a.cmp(&b),
        (Some(FilterValue::Int(a)), Some(FilterValue::Int(b))) => a.cmp(&b),
        (Some(FilterValue::Date(a)), Some(FilterValue::Date(b))) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

fn sample_forecasts() -> Vec<WeatherForecast> {
    [
        ("Partly Cloudy", 40, 63),
        ("Sunny", 0, 78),
        ("Overcast", 65, 55),
        ("Sunny", 5, 71),
        ("Thunderstorms", 90, 68),
        ("Partly Cloudy", 20, 66),
    ]
    .into_iter()
    .map(|(cloud_coverage, percent_to_rain, temperature)| WeatherForecast {
        cloud_coverage: cloud_coverage.to_string(),
        percent_to_rain,
        temperature,
    })
    .collect()
}
