// --- File: crates/geohosting_checkout/src/handlers.rs ---
use axum::{
    extract::{FromRequestParts, OriginalUri, Path, Query, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use geohosting_common::{validation_error, GeohostingError};
use geohosting_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::agreement::{
    client_name, prepare_agreements, required_fields, AgreementAcceptance, AgreementGate,
    GateStep, SignedAgreements,
};
use crate::api::BackendClient;
use crate::error::CheckoutError;
use crate::flow::{CheckoutDraft, CheckoutFlow, DraftStore, FlowOutcome};
use crate::location::LocationLookup;
use crate::models::{Agreement, OrderId, OrderStatus, SalesOrder};
use crate::payment::{
    OrderPaymentContext, PaymentConfirmation, PaymentMethod, PaymentMethodSelector,
    PaymentOutcome, PaymentProviders, PendingPayments, ProviderSession,
};
use crate::router::{canonical_path, canonical_path_for, CheckoutStep, MemoryNavigator, Navigator, RouteDecision};
use crate::validation::validate_app_name;

// --- State for Checkout Handlers ---
pub struct CheckoutState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    pub providers: PaymentProviders,
    pub selector: PaymentMethodSelector,
    pub drafts: Arc<DraftStore>,
    pub pending: PendingPayments,
}

impl CheckoutState {
    pub fn new(
        config: Arc<AppConfig>,
        backend: BackendClient,
        providers: PaymentProviders,
        lookup: Arc<dyn LocationLookup>,
    ) -> Self {
        let ttl = Duration::from_secs(config.checkout.session_ttl_secs);
        let capacity = config.checkout.max_sessions;
        let selector = PaymentMethodSelector::new(lookup, config.checkout.default_country.clone())
            .with_session_limits(ttl, capacity);
        Self {
            config,
            backend,
            providers,
            selector,
            drafts: Arc::new(DraftStore::with_limits(ttl, capacity)),
            pending: PendingPayments::new(ttl, capacity),
        }
    }

    fn flow(&self, token: &str, current_path: String) -> CheckoutFlow<BackendClient, Arc<MemoryNavigator>> {
        CheckoutFlow::new(
            self.backend.authorized(token),
            Arc::new(MemoryNavigator::new(current_path)),
        )
        .with_drafts(self.drafts.clone(), token)
    }
}

/// The buyer's backend token from `Authorization: Token <token>`; also the session key.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
    type Rejection = GeohostingError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Token "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| SessionToken(token.to_string()))
            .ok_or_else(|| {
                GeohostingError::AuthError("Authentication credentials were not provided.".to_string())
            })
    }
}

/// First well-formed address from `x-forwarded-for`, then `x-real-ip`.
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    let real = headers.get("x-real-ip").and_then(|v| v.to_str().ok());
    [forwarded, real]
        .into_iter()
        .flatten()
        .find_map(|value| value.trim().parse::<IpAddr>().ok())
}

// --- Checkout page ---

#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub order: SalesOrder,
    pub step: CheckoutStep,
    pub tracker_index: usize,
    /// `None` when the order status has no checkout route.
    pub canonical_path: Option<String>,
    pub draft: Option<CheckoutDraft>,
}

/// `GET /orders/{id}/{step}`: 303 to the canonical step, or the step's view.
pub async fn checkout_page_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    Path((id, step)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, GeohostingError> {
    let step = CheckoutStep::from_segment(&step)
        .ok_or_else(|| GeohostingError::NotFoundError(format!("Unknown checkout step '{step}'")))?;
    let id = OrderId::from(id);
    let flow = state.flow(&token, uri.path().to_string());

    match flow.load(&id).await {
        FlowOutcome::Routed {
            decision: RouteDecision::Redirect(path),
            ..
        } => Ok(Redirect::to(&path).into_response()),
        FlowOutcome::Routed { order, .. } => {
            let view = CheckoutView {
                canonical_path: canonical_path_for(&order),
                tracker_index: step.index(),
                step,
                draft: state.drafts.get(&token).await,
                order,
            };
            Ok(Json(view).into_response())
        }
        FlowOutcome::Failed(err) => Err(err.into()),
        FlowOutcome::Superseded => Err(CheckoutError::Superseded.into()),
    }
}

// --- Configuration ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct ConfigurationRequest {
    pub app_name: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigurationResponse {
    pub order: SalesOrder,
    /// Where the buyer should be now.
    pub path: String,
}

pub async fn configure_order_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
    Json(payload): Json<ConfigurationRequest>,
) -> Result<Json<ConfigurationResponse>, GeohostingError> {
    validate_app_name(&payload.app_name)?;
    let id = OrderId::from(id);
    state
        .backend
        .authorized(&token)
        .update_app_name(&id, &payload.app_name)
        .await?;
    info!(order_id = %id, app_name = %payload.app_name, "Order configured");

    let flow = state.flow(&token, canonical_path(&id, CheckoutStep::Configuration));
    match flow.load(&id).await {
        FlowOutcome::Routed { order, .. } => Ok(Json(ConfigurationResponse {
            order,
            path: flow.navigator().current_path(),
        })),
        FlowOutcome::Failed(err) => Err(err.into()),
        FlowOutcome::Superseded => Err(CheckoutError::Superseded.into()),
    }
}

// --- Agreements ---

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Deserialize)]
pub struct AgreementsQuery {
    pub company_name: Option<String>,
    /// Buyer's own name, used when there is no company.
    pub client_name: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct AgreementView {
    pub id: u64,
    pub name: String,
    pub template: String,
    pub required_fields: Vec<String>,
}

impl From<Agreement> for AgreementView {
    fn from(agreement: Agreement) -> Self {
        let required_fields = required_fields(&agreement.template)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            id: agreement.id,
            name: agreement.name,
            template: agreement.template,
            required_fields,
        }
    }
}

pub async fn list_agreements_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    Query(query): Query<AgreementsQuery>,
) -> Result<Json<Vec<AgreementView>>, GeohostingError> {
    let agreements = state.backend.authorized(&token).list_agreements().await?;
    let client = client_name(query.company_name.as_deref(), query.client_name.as_deref());
    let prepared = prepare_agreements(agreements, client, Utc::now().date_naive());
    Ok(Json(prepared.into_iter().map(AgreementView::from).collect()))
}

// --- Payment ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct PaymentMethodResponse {
    pub payment_method: PaymentMethod,
}

pub async fn payment_method_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    headers: HeaderMap,
) -> Json<PaymentMethodResponse> {
    let ip = client_ip(&headers).map(|ip| ip.to_string());
    let payment_method = state.selector.select(&token, ip.as_deref()).await;
    Json(PaymentMethodResponse { payment_method })
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct AgreementSubmission {
    pub id: u64,
    /// Values for the template's required placeholders.
    #[serde(default)]
    pub fields: HashMap<String, String>,
    /// Signed document, base64.
    pub document: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub app_name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub agreements: Vec<AgreementSubmission>,
}

/// Runs the agreement gate over the backend's list using the submitted signatures.
async fn collect_signatures(
    backend: &BackendClient,
    payload: &PaymentRequest,
) -> Result<SignedAgreements, GeohostingError> {
    let mut gate = AgreementGate::new();
    let client = client_name(payload.company_name.as_deref(), payload.client_name.as_deref());
    let mut step = gate.open(backend, client).await?;
    loop {
        let agreement = match step {
            GateStep::Completed(signed) => return Ok(signed),
            GateStep::Showing(agreement) => agreement,
        };
        let Some(submission) = payload.agreements.iter().find(|s| s.id == agreement.id) else {
            gate.decline();
            return Err(validation_error(format!("{} was not accepted.", agreement.name)));
        };
        let document = match BASE64.decode(submission.document.trim()) {
            Ok(bytes) => bytes,
            Err(_) => {
                gate.decline();
                return Err(validation_error(format!(
                    "{} document is not valid base64.",
                    agreement.name
                )));
            }
        };
        step = gate.accept(AgreementAcceptance {
            fields: submission.fields.clone(),
            document,
        })?;
    }
}

pub async fn create_payment_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<ProviderSession>, GeohostingError> {
    validate_app_name(&payload.app_name)?;
    let ip = client_ip(&headers).map(|ip| ip.to_string());
    let method = state.selector.select(&token, ip.as_deref()).await;
    state.providers.provider(method)?;

    let backend = state.backend.authorized(&token);
    let agreements = collect_signatures(&backend, &payload).await?;
    state
        .drafts
        .save(
            &token,
            CheckoutDraft {
                app_name: payload.app_name.clone(),
                company_name: payload.company_name.clone(),
            },
        )
        .await;

    let ctx = OrderPaymentContext {
        order_id: OrderId::from(id),
        app_name: payload.app_name,
        company_name: payload.company_name,
        agreements,
    };
    let session = state.providers.initiate(method, &backend, &ctx).await?;
    state.pending.record(&token, session.clone()).await;
    Ok(Json(session))
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub confirmation: PaymentConfirmation,
}

/// Reports a provider-side success for the session this buyer opened on `id`.
/// Failures come back as a retry outcome; success ends the checkout session.
pub async fn confirm_payment_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> Result<Json<PaymentOutcome>, GeohostingError> {
    let id = OrderId::from(id);
    let session = state.pending.get(&token, &id).await.ok_or_else(|| {
        GeohostingError::NotFoundError("No payment in progress for this order.".to_string())
    })?;

    let outcome = state.providers.confirm(&session, &payload.confirmation).await?;
    if let PaymentOutcome::Navigate { .. } = outcome {
        state.pending.finish(&token, &id).await;
        state.selector.forget(&token).await;
        state.drafts.clear(&token).await;
        info!(order_id = %id, method = %session.method, "Payment confirmed");
    }
    Ok(Json(outcome))
}

// --- Draft ---

pub async fn get_draft_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
) -> Json<CheckoutDraft> {
    Json(state.drafts.get(&token).await.unwrap_or_default())
}

pub async fn save_draft_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    Json(draft): Json<CheckoutDraft>,
) -> StatusCode {
    state.drafts.save(&token, draft).await;
    StatusCode::NO_CONTENT
}

// --- Deployment wait ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct DeploymentWaitResponse {
    /// Whether the order left `Waiting Deployment` within the wait window.
    pub done: bool,
    pub path: String,
    pub status: Option<String>,
}

/// Polls the order until deployment finishes or the wait window closes.
pub async fn wait_for_deployment_handler(
    State(state): State<Arc<CheckoutState>>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
) -> Json<DeploymentWaitResponse> {
    let id = OrderId::from(id);
    let flow = state.flow(&token, canonical_path(&id, CheckoutStep::Deployment));
    let interval = Duration::from_secs(state.config.checkout.poll_interval_secs.max(1));
    let window = Duration::from_secs(state.config.checkout.wait_timeout_secs);

    let waited = tokio::time::timeout(
        window,
        flow.poll_until_status_changes(&id, &OrderStatus::WaitingDeployment, interval),
    )
    .await;
    flow.close();

    Json(DeploymentWaitResponse {
        done: waited.is_ok(),
        path: flow.navigator().current_path(),
        status: waited.ok().map(|order| order.order_status.to_string()),
    })
}
