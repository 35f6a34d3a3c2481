// --- File: crates/geohosting_checkout/src/error.rs ---
use geohosting_common::{external_service_error, GeohostingError};
use thiserror::Error;

use crate::payment::PaymentMethod;

/// Network failure or non-2xx answer from the backend. Transient; not retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("backend unreachable: {0}")]
    Network(String),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid backend response: {0}")]
    Decode(String),
}

/// User input rejected. Blocks progression until corrected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}

/// A payment adapter failed. The attempt can be retried.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{method} payment failed: {message}")]
pub struct PaymentProviderError {
    pub method: PaymentMethod,
    pub message: String,
}

impl PaymentProviderError {
    pub fn new(method: PaymentMethod, message: impl Into<String>) -> Self {
        Self {
            method,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payment(#[from] PaymentProviderError),

    #[error("{0} payments are not enabled")]
    ProviderUnavailable(PaymentMethod),

    #[error("order request was superseded")]
    Superseded,
}

impl From<FetchError> for GeohostingError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(message) => GeohostingError::HttpError(message),
            FetchError::Decode(message) => GeohostingError::ParseError(message),
            FetchError::Status { status, message } => match status {
                // The backend answers 400 for rejected input such as a taken app name.
                400 => GeohostingError::ValidationError(message),
                401 | 403 => GeohostingError::AuthError(message),
                404 => GeohostingError::NotFoundError(message),
                _ => external_service_error("GeoHosting API", format!("{status}: {message}")),
            },
        }
    }
}

impl From<CheckoutError> for GeohostingError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Fetch(e) => e.into(),
            CheckoutError::Validation(e) => GeohostingError::ValidationError(e.0),
            CheckoutError::Payment(e) => external_service_error(e.method.label(), e.message),
            CheckoutError::ProviderUnavailable(method) => {
                GeohostingError::UnavailableError(format!("{} payments are not enabled", method))
            }
            CheckoutError::Superseded => {
                GeohostingError::InternalError("order request was superseded".to_string())
            }
        }
    }
}

impl From<ValidationError> for GeohostingError {
    fn from(err: ValidationError) -> Self {
        GeohostingError::ValidationError(err.0)
    }
}
