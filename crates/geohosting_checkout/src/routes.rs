// --- File: crates/geohosting_checkout/src/routes.rs ---
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    checkout_page_handler, configure_order_handler, confirm_payment_handler,
    create_payment_handler, get_draft_handler, list_agreements_handler, payment_method_handler,
    save_draft_handler, wait_for_deployment_handler, CheckoutState,
};

/// Checkout API routes, mounted under `/api`.
pub fn routes(state: Arc<CheckoutState>) -> Router {
    Router::new()
        .route(
            "/checkout/orders/{id}/configuration",
            post(configure_order_handler),
        )
        .route("/checkout/orders/{id}/payment", post(create_payment_handler))
        .route(
            "/checkout/orders/{id}/payment/confirm",
            post(confirm_payment_handler),
        )
        .route(
            "/checkout/orders/{id}/deployment/wait",
            get(wait_for_deployment_handler),
        )
        .route("/checkout/agreements", get(list_agreements_handler))
        .route("/checkout/payment-method", get(payment_method_handler))
        .route(
            "/checkout/draft",
            get(get_draft_handler).put(save_draft_handler),
        )
        .with_state(state)
}

/// The step pages `/orders/{id}/{step}`, mounted at the root.
pub fn page_routes(state: Arc<CheckoutState>) -> Router {
    Router::new()
        .route("/orders/{id}/{step}", get(checkout_page_handler))
        .with_state(state)
}
