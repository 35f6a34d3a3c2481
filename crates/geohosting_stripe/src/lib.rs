// --- File: crates/geohosting_stripe/src/lib.rs ---
pub mod error;
pub mod logic;
pub mod service;

// Re-export for the front service
pub use error::StripeError;
pub use service::StripePaymentProvider;
