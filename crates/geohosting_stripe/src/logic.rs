// --- File: crates/geohosting_stripe/src/logic.rs ---
use geohosting_common::HTTP_CLIENT;
use geohosting_config::StripeConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StripeError;

const CLIENT_SECRET_MARKER: &str = "_secret_";

/// Subset of the Stripe Checkout Session object we read back.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StripeCheckoutSessionData {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    /// "paid", "unpaid" or "no_payment_required"
    pub payment_status: String,
    /// "open", "complete" or "expired"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl StripeCheckoutSessionData {
    pub fn is_paid(&self) -> bool {
        matches!(
            self.payment_status.as_str(),
            "paid" | "no_payment_required"
        ) || self.status.as_deref() == Some("complete")
    }
}

/// Embedded checkout client secrets look like `cs_test_abc_secret_xyz`;
/// the session id is everything before the marker.
pub fn session_id_from_client_secret(client_secret: &str) -> Result<&str, StripeError> {
    match client_secret.split_once(CLIENT_SECRET_MARKER) {
        Some((id, _)) if id.starts_with("cs_") => Ok(id),
        _ => Err(StripeError::InvalidClientSecret),
    }
}

/// Retrieves a Checkout Session by id using the configured secret key.
pub async fn get_checkout_session_details(
    config: &StripeConfig,
    session_id: &str,
) -> Result<StripeCheckoutSessionData, StripeError> {
    let secret_key = config
        .secret_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(StripeError::ConfigError)?;

    let url = format!(
        "{}/v1/checkout/sessions/{}",
        config.api_base_url.trim_end_matches('/'),
        session_id
    );
    debug!("Retrieving Stripe checkout session {}", session_id);

    let response = HTTP_CLIENT
        .get(&url)
        .basic_auth(secret_key, None::<&str>)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.clone());
        warn!("Stripe API error ({}): {}", status, message);
        return Err(StripeError::ApiError {
            status_code: status.as_u16(),
            message,
        });
    }

    let session: StripeCheckoutSessionData = serde_json::from_str(&body)?;
    info!(
        session_id = %session.id,
        payment_status = %session.payment_status,
        "Stripe checkout session retrieved"
    );
    Ok(session)
}

/// Confirms that the session behind `client_secret` has been paid, and that a
/// session tagged with an order reference is tagged with `order_id`.
pub async fn confirm_client_secret(
    config: &StripeConfig,
    client_secret: &str,
    order_id: &str,
) -> Result<StripeCheckoutSessionData, StripeError> {
    let session_id = session_id_from_client_secret(client_secret)?;
    let session = get_checkout_session_details(config, session_id).await?;
    if let Some(found) = session
        .client_reference_id
        .as_deref()
        .filter(|reference| *reference != order_id)
    {
        warn!(session_id = %session.id, expected = %order_id, found = %found, "Stripe session order mismatch");
        return Err(StripeError::SessionOrderMismatch {
            expected: order_id.to_string(),
            found: found.to_string(),
        });
    }
    if session.is_paid() {
        Ok(session)
    } else {
        Err(StripeError::SessionNotComplete {
            status: session.status.clone().unwrap_or_else(|| "unknown".to_string()),
            payment_status: session.payment_status.clone(),
        })
    }
}
