#[cfg(test)]
mod tests {
    use crate::agreement::{AgreementGate, GateStep};
    use crate::error::{CheckoutError, FetchError, PaymentProviderError};
    use crate::location::LocationLookup;
    use crate::models::{OrderId, PaymentSessionResponse};
    use crate::payment::*;
    use geohosting_common::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedLookup {
        country: Result<String, FetchError>,
        calls: AtomicUsize,
    }

    impl FixedLookup {
        fn new(country: Result<&str, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                country: country.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl LocationLookup for FixedLookup {
        fn country_code<'a>(&'a self, _ip: Option<&'a str>) -> BoxFuture<'a, String, FetchError> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                self.country.clone()
            })
        }
    }

    #[test]
    fn test_country_to_method() {
        assert_eq!(PaymentMethod::for_country("ZA"), PaymentMethod::Paystack);
        assert_eq!(PaymentMethod::for_country("za"), PaymentMethod::Paystack);
        assert_eq!(PaymentMethod::for_country("US"), PaymentMethod::Stripe);
        assert_eq!(PaymentMethod::for_country("ZW"), PaymentMethod::Stripe);
    }

    #[tokio::test]
    async fn test_selector_uses_location() {
        let selector = PaymentMethodSelector::new(FixedLookup::new(Ok("ZA")), "US");
        assert_eq!(selector.select("s1", None).await, PaymentMethod::Paystack);

        let selector = PaymentMethodSelector::new(FixedLookup::new(Ok("DE")), "US");
        assert_eq!(selector.select("s1", None).await, PaymentMethod::Stripe);
    }

    #[tokio::test]
    async fn test_lookup_failure_defaults_to_stripe() {
        let lookup = FixedLookup::new(Err(FetchError::Network("offline".into())));
        let selector = PaymentMethodSelector::new(lookup, "US");

        assert_eq!(selector.select("s1", None).await, PaymentMethod::Stripe);
    }

    #[tokio::test]
    async fn test_lookup_runs_once_per_session() {
        let lookup = FixedLookup::new(Ok("ZA"));
        let selector = PaymentMethodSelector::new(lookup.clone(), "US");

        let (a, b, c) = tokio::join!(
            selector.select("s1", None),
            selector.select("s1", None),
            selector.select("s1", Some("196.0.0.1")),
        );
        assert_eq!([a, b, c], [PaymentMethod::Paystack; 3]);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);

        selector.select("s2", None).await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);

        selector.forget("s1").await;
        selector.select("s1", None).await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
    }

    struct EchoBackend;

    impl PaymentBackend for EchoBackend {
        fn create_payment_session<'a>(
            &'a self,
            method: PaymentMethod,
            ctx: &'a OrderPaymentContext,
        ) -> BoxFuture<'a, PaymentSessionResponse, FetchError> {
            Box::pin(async move {
                Ok(PaymentSessionResponse {
                    key: format!("{}-key", method.as_str()),
                    success_url: format!("/#/orders/{}/configuration", ctx.order_id),
                })
            })
        }
    }

    struct FakeProvider(PaymentMethod);

    impl PaymentProvider for FakeProvider {
        fn method(&self) -> PaymentMethod {
            self.0
        }

        fn initiate<'a>(
            &'a self,
            backend: &'a dyn PaymentBackend,
            ctx: &'a OrderPaymentContext,
        ) -> BoxFuture<'a, ProviderSession, PaymentProviderError> {
            Box::pin(async move {
                let response = backend
                    .create_payment_session(self.0, ctx)
                    .await
                    .map_err(|e| PaymentProviderError::new(self.0, e.to_string()))?;
                Ok(ProviderSession {
                    method: self.0,
                    order_id: ctx.order_id.clone(),
                    key: response.key.clone(),
                    success_url: response.success_url,
                    action: SessionAction::Redirect {
                        url: format!("https://pay.example/{}", response.key),
                    },
                })
            })
        }

        fn on_success<'a>(
            &'a self,
            session: &'a ProviderSession,
            _confirmation: &'a PaymentConfirmation,
        ) -> BoxFuture<'a, PaymentOutcome, PaymentProviderError> {
            Box::pin(async move {
                Ok(PaymentOutcome::Navigate {
                    url: session.success_url.clone(),
                })
            })
        }
    }

    fn context() -> OrderPaymentContext {
        let mut gate = AgreementGate::new();
        let GateStep::Completed(agreements) = gate.show(vec![]) else {
            panic!("empty gate completes")
        };
        OrderPaymentContext {
            order_id: OrderId::from(42),
            app_name: "geonode".into(),
            company_name: None,
            agreements,
        }
    }

    #[tokio::test]
    async fn test_dispatch_goes_to_selected_provider() {
        let providers = PaymentProviders::new()
            .with_provider(Arc::new(FakeProvider(PaymentMethod::Stripe)))
            .with_provider(Arc::new(FakeProvider(PaymentMethod::Paystack)));

        let session = providers
            .initiate(PaymentMethod::Paystack, &EchoBackend, &context())
            .await
            .unwrap();

        assert_eq!(session.method, PaymentMethod::Paystack);
        assert_eq!(session.key, "paystack-key");
        let outcome = providers
            .confirm(&session, &PaymentConfirmation::default())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PaymentOutcome::Navigate {
                url: "/#/orders/42/configuration".into()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_provider_is_unavailable() {
        let providers =
            PaymentProviders::new().with_provider(Arc::new(FakeProvider(PaymentMethod::Stripe)));

        let err = providers
            .initiate(PaymentMethod::Paystack, &EchoBackend, &context())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::ProviderUnavailable(PaymentMethod::Paystack)));
    }

    #[test]
    fn test_failure_resets_to_retry() {
        let provider = FakeProvider(PaymentMethod::Stripe);
        let error = PaymentProviderError::new(PaymentMethod::Stripe, "card declined");

        assert_eq!(
            provider.on_failure(None, &error),
            PaymentOutcome::Retry {
                message: "card declined".into()
            }
        );
    }

    #[tokio::test]
    async fn test_selector_sessions_stay_bounded() {
        let lookup = FixedLookup::new(Ok("DE"));
        let selector = PaymentMethodSelector::new(lookup.clone(), "US")
            .with_session_limits(Duration::from_secs(3600), 50);

        for i in 0..1_000 {
            selector.select(&format!("forged-token-{i}"), None).await;
        }

        assert_eq!(selector.tracked_sessions().await, 50);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1_000);
    }

    struct RejectingProvider;

    impl PaymentProvider for RejectingProvider {
        fn method(&self) -> PaymentMethod {
            PaymentMethod::Stripe
        }

        fn initiate<'a>(
            &'a self,
            _backend: &'a dyn PaymentBackend,
            _ctx: &'a OrderPaymentContext,
        ) -> BoxFuture<'a, ProviderSession, PaymentProviderError> {
            Box::pin(async { Err(PaymentProviderError::new(PaymentMethod::Stripe, "card declined")) })
        }

        fn on_success<'a>(
            &'a self,
            _session: &'a ProviderSession,
            _confirmation: &'a PaymentConfirmation,
        ) -> BoxFuture<'a, PaymentOutcome, PaymentProviderError> {
            Box::pin(async { Err(PaymentProviderError::new(PaymentMethod::Stripe, "session unpaid")) })
        }
    }

    fn stripe_session(order_id: u64) -> ProviderSession {
        ProviderSession {
            method: PaymentMethod::Stripe,
            order_id: OrderId::from(order_id),
            key: "cs_test_1_secret_x".into(),
            success_url: format!("/#/orders/{order_id}/configuration"),
            action: SessionAction::Embed {
                publishable_key: "pk".into(),
                client_secret: "cs_test_1_secret_x".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_initiate_failure_is_payment_error() {
        let providers = PaymentProviders::new().with_provider(Arc::new(RejectingProvider));

        let err = providers
            .initiate(PaymentMethod::Stripe, &EchoBackend, &context())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Payment(e) if e.message == "card declined"));
    }

    #[tokio::test]
    async fn test_rejected_confirmation_becomes_retry() {
        let providers = PaymentProviders::new().with_provider(Arc::new(RejectingProvider));

        let outcome = providers
            .confirm(&stripe_session(42), &PaymentConfirmation::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PaymentOutcome::Retry {
                message: "session unpaid".into()
            }
        );
    }

    #[tokio::test]
    async fn test_pending_payments_are_scoped_to_session_and_order() {
        let pending = PendingPayments::new(Duration::from_secs(60), 10);
        pending.record("token-a", stripe_session(42)).await;

        assert!(pending.get("token-a", &OrderId::from(42)).await.is_some());
        assert!(pending.get("token-b", &OrderId::from(42)).await.is_none());
        assert!(pending.get("token-a", &OrderId::from(43)).await.is_none());

        pending.finish("token-a", &OrderId::from(42)).await;
        assert!(pending.get("token-a", &OrderId::from(42)).await.is_none());
    }
}
