//! Structured logging with optional OpenTelemetry export

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Config,
    error::{Error, Result},
};

#[cfg(feature = "observability")]
static TRACER_PROVIDER: std::sync::OnceLock<opentelemetry_sdk::trace::SdkTracerProvider> =
    std::sync::OnceLock::new();

fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.service.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize JSON logging, exporting spans over OTLP when configured
///
/// Must be called from within a Tokio runtime when export is enabled.
#[cfg(feature = "observability")]
pub fn init_tracing(config: &Config) -> Result<()> {
    use opentelemetry::trace::TracerProvider as _;

    let otel_layer = match config.telemetry.export_endpoint() {
        Some(endpoint) => {
            let provider = build_tracer_provider(&config.service.name, endpoint)?;
            let tracer = provider.tracer(config.service.name.clone());
            opentelemetry::global::set_tracer_provider(provider.clone());
            let _ = TRACER_PROVIDER.set(provider);
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().json())
        .with(otel_layer)
        .try_init()
        .map_err(|e| Error::Telemetry(e.to_string()))?;

    tracing::info!(
        service = %config.service.name,
        otlp = config.telemetry.export_endpoint().is_some(),
        "Tracing initialized"
    );

    Ok(())
}

#[cfg(feature = "observability")]
fn build_tracer_provider(
    service_name: &str,
    endpoint: &str,
) -> Result<opentelemetry_sdk::trace::SdkTracerProvider> {
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| Error::Telemetry(format!("failed to build OTLP exporter: {e}")))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build())
}

/// Initialize JSON logging (no span export without the observability feature)
#[cfg(not(feature = "observability"))]
pub fn init_tracing(config: &Config) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| Error::Telemetry(e.to_string()))?;

    tracing::info!(service = %config.service.name, "Tracing initialized");

    Ok(())
}

/// Shutdown tracing and flush spans
#[cfg(feature = "observability")]
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::warn!("Failed to flush spans on shutdown: {}", e);
        }
    }
    tracing::info!("Tracing shutdown complete");
}

/// Shutdown tracing (no-op without observability feature)
#[cfg(not(feature = "observability"))]
pub fn shutdown_tracing() {
    tracing::info!("Tracing shutdown (no-op)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_without_otlp() {
        let config = Config::default();
        assert!(config.telemetry.export_endpoint().is_none());
        // a second global subscriber may already be installed by another test
        let _ = init_tracing(&config);
        shutdown_tracing();
    }

    #[test]
    fn test_invalid_log_level_falls_back() {
        let mut config = Config::default();
        config.service.log_level = "not a [valid directive".into();
        let _ = env_filter(&config);
    }
}
