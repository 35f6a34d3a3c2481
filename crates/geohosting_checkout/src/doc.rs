// --- File: crates/geohosting_checkout/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::flow::CheckoutDraft;
use crate::handlers::{
    AgreementSubmission, AgreementView, AgreementsQuery, ConfigurationRequest,
    ConfirmPaymentRequest, DeploymentWaitResponse, PaymentMethodResponse, PaymentRequest,
};
use crate::payment::{
    PaymentConfirmation, PaymentMethod, PaymentOutcome, ProviderSession, SessionAction,
};
use crate::router::CheckoutStep;

#[utoipa::path(
    get,
    path = "/orders/{id}/{step}",
    params(
        ("id" = String, Path, description = "Sales order id"),
        ("step" = String, Path, description = "payment | configuration | deployment | finish")
    ),
    responses(
        (status = 200, description = "Order is on the requested step"),
        (status = 303, description = "Redirect to the order's canonical step"),
        (status = 404, description = "Unknown step or order")
    ),
    tag = "Checkout"
)]
fn doc_checkout_page_handler() {}

#[utoipa::path(
    post,
    path = "/checkout/orders/{id}/configuration",
    params(("id" = String, Path, description = "Sales order id")),
    request_body(content = ConfigurationRequest, example = json!({"app_name": "my-geonode"})),
    responses(
        (status = 200, description = "App name saved; body carries the order and its canonical path"),
        (status = 400, description = "App name invalid or already taken")
    ),
    tag = "Checkout"
)]
fn doc_configure_order_handler() {}

#[utoipa::path(
    get,
    path = "/checkout/agreements",
    params(AgreementsQuery),
    responses((status = 200, description = "Agreements with load-time placeholders filled", body = [AgreementView])),
    tag = "Checkout"
)]
fn doc_list_agreements_handler() {}

#[utoipa::path(
    get,
    path = "/checkout/payment-method",
    responses((status = 200, description = "Payment method for this session", body = PaymentMethodResponse)),
    tag = "Checkout"
)]
fn doc_payment_method_handler() {}

#[utoipa::path(
    post,
    path = "/checkout/orders/{id}/payment",
    params(("id" = String, Path, description = "Sales order id")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Provider session opened", body = ProviderSession),
        (status = 400, description = "Agreement missing or incomplete"),
        (status = 502, description = "Payment provider failed; retry"),
        (status = 503, description = "Selected provider is not enabled")
    ),
    tag = "Checkout"
)]
fn doc_create_payment_handler() {}

#[utoipa::path(
    post,
    path = "/checkout/orders/{id}/payment/confirm",
    params(("id" = String, Path, description = "Sales order id")),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Navigate on success, retry otherwise", body = PaymentOutcome),
        (status = 404, description = "No payment was opened for this order in this session")
    ),
    tag = "Checkout"
)]
fn doc_confirm_payment_handler() {}

#[utoipa::path(
    get,
    path = "/checkout/orders/{id}/deployment/wait",
    params(("id" = String, Path, description = "Sales order id")),
    responses((status = 200, description = "Deployment finished or wait window elapsed", body = DeploymentWaitResponse)),
    tag = "Checkout"
)]
fn doc_wait_for_deployment_handler() {}

#[utoipa::path(
    get,
    path = "/checkout/draft",
    responses((status = 200, description = "Values entered before payment", body = CheckoutDraft)),
    tag = "Checkout"
)]
fn doc_get_draft_handler() {}

#[utoipa::path(
    put,
    path = "/checkout/draft",
    request_body = CheckoutDraft,
    responses((status = 204, description = "Draft saved")),
    tag = "Checkout"
)]
fn doc_save_draft_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_checkout_page_handler,
        doc_configure_order_handler,
        doc_list_agreements_handler,
        doc_payment_method_handler,
        doc_create_payment_handler,
        doc_confirm_payment_handler,
        doc_wait_for_deployment_handler,
        doc_get_draft_handler,
        doc_save_draft_handler,
    ),
    components(schemas(
        AgreementSubmission,
        AgreementView,
        CheckoutDraft,
        CheckoutStep,
        ConfigurationRequest,
        ConfirmPaymentRequest,
        DeploymentWaitResponse,
        PaymentConfirmation,
        PaymentMethod,
        PaymentMethodResponse,
        PaymentOutcome,
        PaymentRequest,
        ProviderSession,
        SessionAction,
    )),
    tags((name = "Checkout", description = "Order checkout routing, agreements and payment"))
)]
pub struct CheckoutApiDoc;
