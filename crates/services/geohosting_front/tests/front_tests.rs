use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use geohosting_checkout::PaymentMethod;
use geohosting_config::{config_from_toml, AppConfig};
use geohosting_front::{app, payment_providers};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn config(flags: &str) -> AppConfig {
    config_from_toml(&format!(
        r#"{flags}
[server]
host = "127.0.0.1"
port = 0

[backend]
base_url = "http://127.0.0.1:9"

[stripe]
publishable_key = "pk_test_front"

[paystack]
checkout_base_url = "https://checkout.paystack.com"
"#
    ))
    .unwrap()
}

#[tokio::test]
async fn health_is_served_at_root() {
    let router = app(Arc::new(config("use_stripe = true"))).unwrap();
    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn checkout_api_is_nested_under_api() {
    let router = app(Arc::new(config(""))).unwrap();
    let response = router
        .oneshot(Request::get("/api/checkout/draft").body(Body::empty()).unwrap())
        .await
        .unwrap();
    // Reached the checkout routes; rejected only for the missing token.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[cfg(feature = "stripe")]
#[test]
fn stripe_follows_runtime_flag() {
    let enabled = payment_providers(&config("use_stripe = true"));
    assert!(enabled.provider(PaymentMethod::Stripe).is_ok());

    let disabled = payment_providers(&config("use_stripe = false"));
    assert!(disabled.provider(PaymentMethod::Stripe).is_err());
}

#[cfg(feature = "paystack")]
#[test]
fn paystack_follows_runtime_flag() {
    let enabled = payment_providers(&config("use_paystack = true"));
    assert!(enabled.provider(PaymentMethod::Paystack).is_ok());
    assert!(enabled.provider(PaymentMethod::Stripe).is_err());

    let disabled = payment_providers(&config("use_paystack = false"));
    assert!(disabled.provider(PaymentMethod::Paystack).is_err());
}
