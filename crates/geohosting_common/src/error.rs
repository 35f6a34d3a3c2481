// --- File: crates/geohosting_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by all GeoHosting crates.
///
/// Feature crates keep their own error enums and implement
/// `From<TheirError> for GeohostingError` so handlers can return one type.
#[derive(Error, Debug)]
pub enum GeohostingError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The backend rejected our credentials
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// User input rejected; blocks progression until corrected
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An upstream service (backend API, payment provider) failed
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Feature switched off in configuration
    #[error("Service unavailable: {0}")]
    UnavailableError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for GeohostingError {
    fn status_code(&self) -> u16 {
        match self {
            GeohostingError::HttpError(_) => 502,
            GeohostingError::ParseError(_) => 400,
            GeohostingError::ConfigError(_) => 500,
            GeohostingError::AuthError(_) => 401,
            GeohostingError::ValidationError(_) => 400,
            GeohostingError::ExternalServiceError { .. } => 502,
            GeohostingError::NotFoundError(_) => 404,
            GeohostingError::UnavailableError(_) => 503,
            GeohostingError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for GeohostingError {
    fn from(err: reqwest::Error) -> Self {
        GeohostingError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for GeohostingError {
    fn from(err: serde_json::Error) -> Self {
        GeohostingError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> GeohostingError {
    GeohostingError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> GeohostingError {
    GeohostingError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
