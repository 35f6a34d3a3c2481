// --- File: crates/geohosting_common/src/routes.rs ---
use axum::{routing::get, Router};

use crate::handlers::health_handler;

/// Routes shared by every GeoHosting service.
pub fn routes() -> Router {
    Router::new().route("/health", get(health_handler))
}
