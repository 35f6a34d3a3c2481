// --- File: crates/geohosting_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod handlers; // Shared HTTP handlers
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod routes; // Shared route definitions
pub mod services; // Service abstractions

// Re-export the routes function to be used by the front service
pub use routes::routes;

pub use error::{external_service_error, validation_error, GeohostingError, HttpStatusCode};

pub use http::{
    client::{create_client, HTTP_CLIENT},
    IntoHttpResponse,
};

pub use logging::{init, init_with_level};

pub use features::is_feature_enabled;

#[cfg(feature = "stripe")]
pub use features::is_stripe_enabled;

#[cfg(feature = "paystack")]
pub use features::is_paystack_enabled;

pub use services::BoxFuture;
