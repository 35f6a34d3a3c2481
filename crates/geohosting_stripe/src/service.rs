// --- File: crates/geohosting_stripe/src/service.rs ---
use geohosting_checkout::{
    OrderPaymentContext, PaymentBackend, PaymentConfirmation, PaymentMethod, PaymentOutcome,
    PaymentProvider, PaymentProviderError, ProviderSession, SessionAction,
};
use geohosting_common::BoxFuture;
use geohosting_config::StripeConfig;
use tracing::info;

use crate::logic::confirm_client_secret;

/// Embedded Stripe checkout.
///
/// The backend creates the Checkout Session and hands back its client
/// secret; the page mounts Stripe's embedded form with it.
pub struct StripePaymentProvider {
    config: StripeConfig,
}

impl StripePaymentProvider {
    pub fn new(config: StripeConfig) -> Self {
        Self { config }
    }

    fn verifies_sessions(&self) -> bool {
        self.config
            .secret_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }
}

impl PaymentProvider for StripePaymentProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Stripe
    }

    fn initiate<'a>(
        &'a self,
        backend: &'a dyn PaymentBackend,
        ctx: &'a OrderPaymentContext,
    ) -> BoxFuture<'a, ProviderSession, PaymentProviderError> {
        Box::pin(async move {
            let response = backend
                .create_payment_session(PaymentMethod::Stripe, ctx)
                .await
                .map_err(|e| PaymentProviderError::new(PaymentMethod::Stripe, e.to_string()))?;

            Ok(ProviderSession {
                method: PaymentMethod::Stripe,
                order_id: ctx.order_id.clone(),
                action: SessionAction::Embed {
                    publishable_key: self.config.publishable_key.clone(),
                    client_secret: response.key.clone(),
                },
                key: response.key,
                success_url: response.success_url,
            })
        })
    }

    fn on_success<'a>(
        &'a self,
        session: &'a ProviderSession,
        _confirmation: &'a PaymentConfirmation,
    ) -> BoxFuture<'a, PaymentOutcome, PaymentProviderError> {
        Box::pin(async move {
            if self.verifies_sessions() {
                confirm_client_secret(&self.config, &session.key, session.order_id.as_str()).await?;
            }
            info!(order_id = %session.order_id, "Stripe payment completed");
            Ok(PaymentOutcome::Navigate {
                url: session.success_url.clone(),
            })
        })
    }
}
