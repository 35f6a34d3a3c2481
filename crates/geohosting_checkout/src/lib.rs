// --- File: crates/geohosting_checkout/src/lib.rs ---
pub mod agreement;
pub mod api;
pub mod doc;
pub mod error;
pub mod fetcher;
#[cfg(test)]
mod fetcher_test;
pub mod flow;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
pub mod location;
pub mod models;
#[cfg(test)]
mod models_test;
pub mod payment;
#[cfg(test)]
mod payment_test;
pub mod router;
pub mod routes;
pub mod session;
#[cfg(test)]
mod session_test;
pub mod validation;

// Re-export for the front service and the provider crates
pub use api::BackendClient;
pub use error::{CheckoutError, FetchError, PaymentProviderError, ValidationError};
pub use handlers::CheckoutState;
pub use location::{IpApiLookup, LocationLookup};
pub use models::{Agreement, OrderId, OrderStatus, SalesOrder};
pub use payment::{
    OrderPaymentContext, PaymentBackend, PaymentConfirmation, PaymentMethod, PaymentOutcome,
    PaymentProvider, PaymentProviders, PendingPayments, ProviderSession, SessionAction,
};
pub use router::{CheckoutRouter, CheckoutStep, Navigator, RouteDecision};
pub use routes::{page_routes, routes};
