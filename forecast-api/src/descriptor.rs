//! Field table for the weather entity

use forecast_core::query::{DescriptorError, EntityDescriptor, Field, FieldKind};

/// Entity name used in descriptor errors
pub const WEATHER_ENTITY: &str = "WeatherForecast";

/// Build the weather descriptor
///
/// Called once at startup; the binary refuses to start if this fails.
pub fn weather_descriptor() -> Result<EntityDescriptor, DescriptorError> {
    EntityDescriptor::builder(WEATHER_ENTITY)
        .field(
            Field::new("cloudCoverage", "CloudCoverage", FieldKind::Str)
                .filterable()
                .sortable()
                .length(1, 50, true)
                .pattern(r"^[A-Za-z ]+$"),
        )
        .field(
            Field::new("percentToRain", "PercentToRain", FieldKind::Int)
                .filterable()
                .sortable()
                .range(0, 100, true),
        )
        .field(
            Field::new("temperature", "Temperature", FieldKind::Int)
                .filterable()
                .sortable()
                .range(-100, 150, true),
        )
        .build()
}
