// File: services/geohosting_front/src/main.rs
use geohosting_common::GeohostingError;
use geohosting_config::load_config;
use geohosting_front::app;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("GeoHosting front stopped: {}", err);
        eprintln!("GeoHosting front stopped: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), GeohostingError> {
    let config = Arc::new(
        load_config().map_err(|e| GeohostingError::ConfigError(e.to_string()))?,
    );
    // Keep the guard alive so the file writer flushes on shutdown.
    let _log_guard = geohosting_common::init(&config.logging);

    let app = app(config.clone())?;

    // Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| GeohostingError::ConfigError(format!("cannot bind {addr}: {e}")))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| GeohostingError::InternalError(e.to_string()))
}
