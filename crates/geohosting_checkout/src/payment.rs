// --- File: crates/geohosting_checkout/src/payment.rs ---
//! Payment provider contract and per-session provider selection.

use geohosting_common::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

use crate::agreement::SignedAgreements;
use crate::error::{CheckoutError, FetchError, PaymentProviderError};
use crate::location::LocationLookup;
use crate::models::{OrderId, PaymentSessionResponse};
use crate::session::SessionCache;

/// Country served by the redirect provider.
pub const PAYSTACK_COUNTRY: &str = "ZA";

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    Paystack,
}

impl PaymentMethod {
    /// Backend path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Paystack => "paystack",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Stripe => "Stripe",
            PaymentMethod::Paystack => "Paystack",
        }
    }

    pub fn for_country(country_code: &str) -> Self {
        if country_code.trim().eq_ignore_ascii_case(PAYSTACK_COUNTRY) {
            PaymentMethod::Paystack
        } else {
            PaymentMethod::Stripe
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a provider needs to open a payment for an order.
#[derive(Debug, Clone)]
pub struct OrderPaymentContext {
    pub order_id: OrderId,
    pub app_name: String,
    pub company_name: Option<String>,
    pub agreements: SignedAgreements,
}

/// Creates provider sessions on the backend.
pub trait PaymentBackend: Send + Sync {
    fn create_payment_session<'a>(
        &'a self,
        method: PaymentMethod,
        ctx: &'a OrderPaymentContext,
    ) -> BoxFuture<'a, PaymentSessionResponse, FetchError>;
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionAction {
    /// Mount the provider's embedded checkout.
    Embed {
        publishable_key: String,
        client_secret: String,
    },
    /// Send the buyer to the provider's hosted page.
    Redirect { url: String },
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub method: PaymentMethod,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub order_id: OrderId,
    /// Client secret (Stripe) or access code (Paystack).
    pub key: String,
    pub success_url: String,
    pub action: SessionAction,
}

/// Provider-side evidence of a completed payment.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// Transaction reference, when the provider reports one.
    #[serde(default)]
    pub reference: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Navigate { url: String },
    Retry { message: String },
}

pub trait PaymentProvider: Send + Sync {
    fn method(&self) -> PaymentMethod;

    fn initiate<'a>(
        &'a self,
        backend: &'a dyn PaymentBackend,
        ctx: &'a OrderPaymentContext,
    ) -> BoxFuture<'a, ProviderSession, PaymentProviderError>;

    fn on_success<'a>(
        &'a self,
        session: &'a ProviderSession,
        confirmation: &'a PaymentConfirmation,
    ) -> BoxFuture<'a, PaymentOutcome, PaymentProviderError>;

    /// Resets the attempt to a retryable state.
    fn on_failure(
        &self,
        session: Option<&ProviderSession>,
        error: &PaymentProviderError,
    ) -> PaymentOutcome {
        warn!(
            method = %self.method(),
            order_id = ?session.map(|s| &s.order_id),
            error = %error,
            "Payment attempt failed"
        );
        PaymentOutcome::Retry {
            message: error.message.clone(),
        }
    }
}

/// The enabled adapters, keyed by method.
#[derive(Clone, Default)]
pub struct PaymentProviders {
    stripe: Option<Arc<dyn PaymentProvider>>,
    paystack: Option<Arc<dyn PaymentProvider>>,
}

impl PaymentProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        match provider.method() {
            PaymentMethod::Stripe => self.stripe = Some(provider),
            PaymentMethod::Paystack => self.paystack = Some(provider),
        }
        self
    }

    /// The single dispatch point from method to adapter.
    pub fn provider(&self, method: PaymentMethod) -> Result<&Arc<dyn PaymentProvider>, CheckoutError> {
        match method {
            PaymentMethod::Stripe => self.stripe.as_ref(),
            PaymentMethod::Paystack => self.paystack.as_ref(),
        }
        .ok_or(CheckoutError::ProviderUnavailable(method))
    }

    pub async fn initiate(
        &self,
        method: PaymentMethod,
        backend: &dyn PaymentBackend,
        ctx: &OrderPaymentContext,
    ) -> Result<ProviderSession, CheckoutError> {
        let provider = self.provider(method)?;
        match provider.initiate(backend, ctx).await {
            Ok(session) => {
                info!(order_id = %ctx.order_id, method = %method, "Payment session created");
                Ok(session)
            }
            Err(err) => {
                provider.on_failure(None, &err);
                Err(err.into())
            }
        }
    }

    /// Settles a provider-side success; a failed check comes back as `Retry`.
    pub async fn confirm(
        &self,
        session: &ProviderSession,
        confirmation: &PaymentConfirmation,
    ) -> Result<PaymentOutcome, CheckoutError> {
        let provider = self.provider(session.method)?;
        Ok(match provider.on_success(session, confirmation).await {
            Ok(outcome) => outcome,
            Err(err) => provider.on_failure(Some(session), &err),
        })
    }
}

/// Sessions opened by [`PaymentProviders::initiate`], held server-side until
/// the buyer confirms. Confirmation only ever trusts these.
#[derive(Default)]
pub struct PendingPayments {
    sessions: Mutex<SessionCache<ProviderSession>>,
}

impl PendingPayments {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(SessionCache::new(ttl, capacity)),
        }
    }

    fn key(session: &str, order_id: &OrderId) -> String {
        format!("{session}:{order_id}")
    }

    pub async fn record(&self, session: &str, provider_session: ProviderSession) {
        let key = Self::key(session, &provider_session.order_id);
        self.sessions.lock().await.insert(key, provider_session);
    }

    pub async fn get(&self, session: &str, order_id: &OrderId) -> Option<ProviderSession> {
        self.sessions
            .lock()
            .await
            .get(&Self::key(session, order_id))
            .cloned()
    }

    pub async fn finish(&self, session: &str, order_id: &OrderId) {
        self.sessions
            .lock()
            .await
            .remove(&Self::key(session, order_id));
    }
}

/// Picks the payment method once per session from the buyer's location.
pub struct PaymentMethodSelector {
    lookup: Arc<dyn LocationLookup>,
    default_country: String,
    sessions: Mutex<SessionCache<Arc<OnceCell<PaymentMethod>>>>,
}

impl PaymentMethodSelector {
    pub fn new(lookup: Arc<dyn LocationLookup>, default_country: impl Into<String>) -> Self {
        Self {
            lookup,
            default_country: default_country.into(),
            sessions: Mutex::new(SessionCache::default()),
        }
    }

    /// Bounds how long, and for how many sessions, a choice is remembered.
    pub fn with_session_limits(self, ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(SessionCache::new(ttl, capacity)),
            ..self
        }
    }

    /// Concurrent first calls for one session share a single lookup.
    pub async fn select(&self, session: &str, client_ip: Option<&str>) -> PaymentMethod {
        let cell = {
            let mut sessions = self.sessions.lock().await;
            sessions.get_or_insert_with(session, Default::default).clone()
        };
        *cell
            .get_or_init(|| async {
                let country = match self.lookup.country_code(client_ip).await {
                    Ok(code) => code,
                    Err(err) => {
                        warn!(error = %err, default = %self.default_country, "Location lookup failed");
                        self.default_country.clone()
                    }
                };
                let method = PaymentMethod::for_country(&country);
                info!(country = %country, method = %method, "Payment method selected");
                method
            })
            .await
    }

    /// Drops the cached choice once checkout is done.
    pub async fn forget(&self, session: &str) {
        self.sessions.lock().await.remove(session);
    }

    pub async fn tracked_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
