pub mod weather;

pub use weather::{get_weather_forecast, list_weather_forecasts};
