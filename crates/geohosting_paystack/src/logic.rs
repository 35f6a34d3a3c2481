// --- File: crates/geohosting_paystack/src/logic.rs ---

use geohosting_checkout::{PaymentMethod, PaymentProviderError};
use geohosting_common::{external_service_error, GeohostingError, HTTP_CLIENT};
use geohosting_config::PaystackConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

// --- Error Handling ---
#[derive(Error, Debug)]
pub enum PaystackError {
    #[error("Paystack API request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Paystack API returned an error: Status={status}, Message='{message}'")]
    ApiError { status: u16, message: String },
    #[error("Failed to parse Paystack API response: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Paystack configuration missing or incomplete")]
    ConfigError,
    #[error("Transaction {reference} is {status}")]
    TransactionNotSuccessful { reference: String, status: String },
    #[error("Paystack transaction reference is required")]
    MissingReference,
}

impl From<PaystackError> for GeohostingError {
    fn from(err: PaystackError) -> Self {
        match err {
            PaystackError::RequestError(e) => GeohostingError::HttpError(e.to_string()),
            PaystackError::ParseError(e) => GeohostingError::ParseError(e.to_string()),
            PaystackError::ConfigError => GeohostingError::ConfigError(
                "Paystack configuration missing or incomplete".to_string(),
            ),
            e @ PaystackError::MissingReference => GeohostingError::ValidationError(e.to_string()),
            other => external_service_error("Paystack", other),
        }
    }
}

impl From<PaystackError> for PaymentProviderError {
    fn from(err: PaystackError) -> Self {
        PaymentProviderError::new(PaymentMethod::Paystack, err.to_string())
    }
}

// --- Structures for Paystack API Response (Transaction Verify) ---
#[derive(Deserialize, Debug, Clone)]
pub struct PaystackTransaction {
    pub reference: String,
    /// "success", "failed", "abandoned", "ongoing", ...
    pub status: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PaystackApiResponse {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<PaystackTransaction>,
}

/// Hosted checkout page for an access code issued by the backend.
pub fn checkout_url(config: &PaystackConfig, access_code: &str) -> String {
    format!(
        "{}/{}",
        config.checkout_base_url.trim_end_matches('/'),
        access_code
    )
}

/// Verifies a transaction reference and requires a successful charge.
pub async fn verify_transaction(
    config: &PaystackConfig,
    reference: &str,
) -> Result<PaystackTransaction, PaystackError> {
    let secret_key = config
        .secret_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(PaystackError::ConfigError)?;

    let url = format!(
        "{}/transaction/verify/{}",
        config.api_base_url.trim_end_matches('/'),
        reference
    );

    let response = HTTP_CLIENT.get(&url).bearer_auth(secret_key).send().await?;
    let status = response.status();
    let body = response.text().await?;

    let parsed: Result<PaystackApiResponse, _> = serde_json::from_str(&body);
    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|r| r.message)
            .unwrap_or(body);
        warn!("Paystack verify failed ({}): {}", status, message);
        return Err(PaystackError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    let parsed = parsed?;
    let transaction = match (parsed.status, parsed.data) {
        (true, Some(data)) => data,
        _ => {
            return Err(PaystackError::ApiError {
                status: status.as_u16(),
                message: parsed
                    .message
                    .unwrap_or_else(|| "Verification failed".to_string()),
            })
        }
    };

    if transaction.status != "success" {
        return Err(PaystackError::TransactionNotSuccessful {
            reference: transaction.reference,
            status: transaction.status,
        });
    }
    info!(reference = %transaction.reference, "Paystack transaction verified");
    Ok(transaction)
}
