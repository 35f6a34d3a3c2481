// --- File: crates/geohosting_paystack/src/service.rs ---
use geohosting_checkout::{
    OrderPaymentContext, PaymentBackend, PaymentConfirmation, PaymentMethod, PaymentOutcome,
    PaymentProvider, PaymentProviderError, ProviderSession, SessionAction,
};
use geohosting_common::BoxFuture;
use geohosting_config::PaystackConfig;
use tracing::{debug, info};

use crate::logic::{checkout_url, verify_transaction, PaystackError};

pub struct PaystackPaymentProvider {
    config: PaystackConfig,
}

impl PaystackPaymentProvider {
    pub fn new(config: PaystackConfig) -> Self {
        Self { config }
    }
}

impl PaymentProvider for PaystackPaymentProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Paystack
    }

    /// Resumes the transaction the backend initialized, on Paystack's page.
    fn initiate<'a>(
        &'a self,
        backend: &'a dyn PaymentBackend,
        ctx: &'a OrderPaymentContext,
    ) -> BoxFuture<'a, ProviderSession, PaymentProviderError> {
        Box::pin(async move {
            let response = backend
                .create_payment_session(PaymentMethod::Paystack, ctx)
                .await
                .map_err(|e| PaymentProviderError::new(PaymentMethod::Paystack, e.to_string()))?;

            Ok(ProviderSession {
                method: PaymentMethod::Paystack,
                order_id: ctx.order_id.clone(),
                action: SessionAction::Redirect {
                    url: checkout_url(&self.config, &response.key),
                },
                key: response.key,
                success_url: response.success_url,
            })
        })
    }

    fn on_success<'a>(
        &'a self,
        session: &'a ProviderSession,
        confirmation: &'a PaymentConfirmation,
    ) -> BoxFuture<'a, PaymentOutcome, PaymentProviderError> {
        Box::pin(async move {
            let has_secret = self
                .config
                .secret_key
                .as_deref()
                .is_some_and(|k| !k.is_empty());
            match (confirmation.reference.as_deref(), has_secret) {
                (Some(reference), true) => {
                    verify_transaction(&self.config, reference).await?;
                }
                (None, true) => return Err(PaystackError::MissingReference.into()),
                (_, false) => debug!(order_id = %session.order_id, "Skipping Paystack verification"),
            }
            info!(order_id = %session.order_id, "Paystack payment completed");
            Ok(PaymentOutcome::Navigate {
                url: session.success_url.clone(),
            })
        })
    }
}
