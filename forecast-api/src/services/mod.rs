pub mod weather;

pub use weather::WeatherService;
