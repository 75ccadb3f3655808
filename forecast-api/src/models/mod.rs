pub mod weather;

pub use weather::{
    ForecastQuery, GetWeatherForecastRequest, GetWeatherForecastResponse, ListForecastsParams,
    WeatherForecast,
};
