//! Products API - REST server over PostgreSQL or SQL Server

use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod server;
mod state;

use config::Config;
use state::{AppState, Backend};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let backend = Backend::connect(&config.database).await?;

    let state = AppState {
        config: config.clone(),
        backend,
    };

    let app = server::create_router(api::routes(&state), &config)?;

    info!(
        environment = %config.environment,
        dialect = %config.database.dialect(),
        "Starting Products API on port {}",
        config.server.port
    );

    let backend = state.backend.clone();
    server::serve(app, &config.server, async move {
        info!("Shutting down: closing database connections");
        backend.close().await;
    })
    .await?;

    info!("Products API shutdown complete");
    Ok(())
}
