use chrono::NaiveDateTime;
use forecast_core::query::{
    EntityDescriptor, FilterValue, OffsetLimit, QueryError, ValidatedFilter, ValidatedSort,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Forecast for one location and day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    #[schema(example = "Partly Cloudy")]
    pub cloud_coverage: String,
    #[schema(example = 40)]
    pub percent_to_rain: i32,
    /// Degrees Fahrenheit
    #[schema(example = 63)]
    pub temperature: i32,
}

impl WeatherForecast {
    /// Value stored in a warehouse column, used when answering filters in memory
    pub fn column_value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "CloudCoverage" => Some(FilterValue::Str(self.cloud_coverage.clone())),
            "PercentToRain" => Some(FilterValue::Int(i64::from(self.percent_to_rain))),
            "Temperature" => Some(FilterValue::Int(i64::from(self.temperature))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetWeatherForecastRequest {
    /// Day the forecast is requested for
    #[schema(value_type = String, example = "2026-10-16T00:00:00")]
    pub date: NaiveDateTime,
    #[schema(example = "34.8526")]
    pub latitude: String,
    #[schema(example = "-82.3940")]
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetWeatherForecastResponse {
    pub forecast: WeatherForecast,
    #[schema(value_type = String, example = "2026-10-16T00:00:00")]
    pub forecast_issue_date: NaiveDateTime,
}

/// Query string accepted by the forecast listing
///
/// `filter` and `sort` use the `?filter=Field=Value,...` and
/// `?sort=Field:asc,...` grammar. `sortBy`/`sortOperator` name a single sort
/// key and are used only when `sort` is absent.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListForecastsParams {
    /// e.g. `Temperature=63,CloudCoverage=Sunny`
    pub filter: Option<String>,
    /// e.g. `Temperature:desc,PercentToRain:asc`
    pub sort: Option<String>,
    pub sort_by: Option<String>,
    pub sort_operator: Option<String>,
    pub offset: Option<i32>,
    /// Page size; `pageSize` is accepted as well
    #[serde(alias = "pageSize")]
    pub limit: Option<i32>,
}

/// Listing request after validation against the weather descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastQuery {
    pub filter: ValidatedFilter,
    pub sort: ValidatedSort,
    pub paging: OffsetLimit,
}

impl ListForecastsParams {
    /// Validate every part of the query string
    ///
    /// The first rejection wins; filter is checked before sort, sort before paging.
    pub fn validate(&self, descriptor: &EntityDescriptor) -> Result<ForecastQuery, QueryError> {
        let filter = descriptor.validate_filter(self.filter.as_deref().unwrap_or_default())?;

        let sort = match self.sort.as_deref() {
            Some(sort) if !sort.trim().is_empty() => descriptor.validate_sort(sort)?,
            _ => descriptor.sort_by(self.sort_by.as_deref(), self.sort_operator.as_deref())?,
        };

        let defaults = OffsetLimit::default();
        let paging = OffsetLimit::new(
            self.offset.unwrap_or(defaults.offset),
            self.limit.unwrap_or(defaults.limit),
        )?;

        Ok(ForecastQuery {
            filter,
            sort,
            paging,
        })
    }
}
