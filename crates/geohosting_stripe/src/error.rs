// --- File: crates/geohosting_stripe/src/error.rs ---
use geohosting_checkout::{PaymentMethod, PaymentProviderError};
use geohosting_common::{external_service_error, GeohostingError, HttpStatusCode};
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Secret key needed but not configured
    #[error("Stripe configuration missing or incomplete")]
    ConfigError,

    #[error("Client secret does not identify a checkout session")]
    InvalidClientSecret,

    /// Session exists but is not paid yet
    #[error("Checkout session is {status} (payment {payment_status})")]
    SessionNotComplete {
        status: String,
        payment_status: String,
    },

    #[error("Checkout session belongs to order {found}, not {expected}")]
    SessionOrderMismatch { expected: String, found: String },
}

impl From<StripeError> for GeohostingError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => {
                GeohostingError::HttpError(format!("Stripe request error: {}", e))
            }
            StripeError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Stripe API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            StripeError::ParseError(e) => {
                GeohostingError::ParseError(format!("Stripe response parse error: {}", e))
            }
            StripeError::ConfigError => GeohostingError::ConfigError(
                "Stripe configuration missing or incomplete".to_string(),
            ),
            e @ StripeError::InvalidClientSecret => GeohostingError::ValidationError(e.to_string()),
            e @ StripeError::SessionNotComplete { .. } => external_service_error("Stripe", e),
            e @ StripeError::SessionOrderMismatch { .. } => GeohostingError::ValidationError(e.to_string()),
        }
    }
}

impl From<StripeError> for PaymentProviderError {
    fn from(err: StripeError) -> Self {
        PaymentProviderError::new(PaymentMethod::Stripe, err.to_string())
    }
}

impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::RequestError(_) => 502,
            StripeError::ApiError { status_code, .. } => *status_code,
            StripeError::ParseError(_) => 502,
            StripeError::ConfigError => 500,
            StripeError::InvalidClientSecret => 400,
            StripeError::SessionNotComplete { .. } => 402,
            StripeError::SessionOrderMismatch { .. } => 409,
        }
    }
}
