//! soc API Server Entry Point
//!
//! Reads configuration from the environment, checks where the study
//! database is expected and starts the Axum HTTP server.

use soc_api::telemetry::{init_tracing, TelemetryConfig};
use soc_api::{bind_listener, create_router, serve, ApiResult, AppState, DbConfig, ServerConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::from_env())?;

    let db_config = DbConfig::from_env();
    let server_config = ServerConfig::from_env()?;

    if !db_config.path.is_file() {
        // Pages answer 500 until the file appears; the server still starts.
        tracing::warn!(path = %db_config.path.display(), "Study database not found");
    }

    let state = AppState::from_config(&db_config);
    let app = create_router(state, &server_config.static_dir);

    let (listener, addr) = bind_listener(&server_config).await?;
    tracing::info!(
        %addr,
        db_path = %db_config.path.display(),
        static_dir = %server_config.static_dir.display(),
        "Starting soc API server"
    );

    serve(listener, app).await?;
    tracing::info!("Server stopped");
    Ok(())
}
