// --- File: crates/geohosting_paystack/src/lib.rs ---
pub mod logic;
pub mod service;

pub use logic::PaystackError;
pub use service::PaystackPaymentProvider;
