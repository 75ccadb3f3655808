use forecast_api::{router, ApiState};
use forecast_core::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        "Starting weather forecast API"
    );

    let state = ApiState::new(config.clone())?;
    let app = router(state)?;

    let result = Server::new(config).serve(app).await;
    shutdown_tracing();

    result?;
    Ok(())
}
