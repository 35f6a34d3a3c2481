// --- File: crates/geohosting_checkout/src/api.rs ---
//! Client for the GeoHosting REST backend.

use geohosting_common::{create_client, BoxFuture, GeohostingError};
use geohosting_config::BackendConfig;
use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::agreement::AgreementSource;
use crate::error::FetchError;
use crate::fetcher::OrderSource;
use crate::models::{Agreement, AgreementList, OrderId, PaymentSessionResponse, SalesOrder};
use crate::payment::{OrderPaymentContext, PaymentBackend, PaymentMethod};

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, GeohostingError> {
        let http = create_client(config.timeout_secs, true)?;
        Ok(Self::with_client(http, &config.base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// A copy that sends `Authorization: Token <token>`.
    pub fn authorized(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("Token {token}")),
            None => builder,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: &OrderId) -> Result<SalesOrder, FetchError> {
        let response = send(self.request(Method::GET, &format!("orders/{id}/"))).await?;
        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn update_app_name(&self, id: &OrderId, app_name: &str) -> Result<SalesOrder, FetchError> {
        let request = self
            .request(Method::PATCH, &format!("orders/{id}/"))
            .json(&json!({ "app_name": app_name }));
        read_json(send(request).await?).await
    }

    pub async fn list_agreements(&self) -> Result<Vec<Agreement>, FetchError> {
        let response = send(self.request(Method::GET, "agreements/")).await?;
        let list: AgreementList = read_json(response).await?;
        Ok(list.into())
    }

    /// Posts the signed agreements and order configuration; the backend opens
    /// a session with the provider and returns its key.
    #[instrument(skip(self, ctx), fields(order_id = %ctx.order_id))]
    pub async fn create_payment_session(
        &self,
        method: PaymentMethod,
        ctx: &OrderPaymentContext,
    ) -> Result<PaymentSessionResponse, FetchError> {
        let mut form = multipart::Form::new();
        for agreement in ctx.agreements.iter() {
            let part = multipart::Part::bytes(agreement.document.clone())
                .file_name(format!("agreement-{}.pdf", agreement.id))
                .mime_str("application/pdf")
                .map_err(|e| FetchError::Network(e.to_string()))?;
            form = form.part(format!("agreement-{}", agreement.id), part);
        }
        let agreement_ids = serde_json::to_string(&ctx.agreements.ids())
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        form = form
            .text("app_name", ctx.app_name.clone())
            .text("company_name", ctx.company_name.clone().unwrap_or_default())
            .text("agreement_ids", agreement_ids);

        let path = format!("orders/{}/payment/{}", ctx.order_id, method.as_str());
        debug!(agreements = ctx.agreements.len(), "Requesting payment session");
        read_json(send(self.request(Method::POST, &path).multipart(form)).await?).await
    }
}

async fn send(request: RequestBuilder) -> Result<Response, FetchError> {
    request
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            message: backend_error_message(&body, status.canonical_reason()),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// Extracts a readable message from a backend error body.
///
/// Understands `{"detail": "..."}`, field errors such as
/// `{"app_name": ["App name is already taken."]}`, and bare strings.
pub fn backend_error_message(body: &str, fallback: Option<&str>) -> String {
    let fallback = || fallback.unwrap_or("request failed").to_string();
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            if let Some(Value::String(detail)) = map.get("detail") {
                return detail.clone();
            }
            let messages: Vec<String> = map
                .values()
                .filter_map(|value| match value {
                    Value::String(s) => Some(s.clone()),
                    Value::Array(items) => items.iter().find_map(|i| i.as_str().map(str::to_string)),
                    _ => None,
                })
                .collect();
            if messages.is_empty() {
                fallback()
            } else {
                messages.join(" ")
            }
        }
        Ok(Value::String(s)) => s,
        Ok(Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        _ if !body.trim().is_empty() && body.len() <= 200 => body.trim().to_string(),
        _ => fallback(),
    }
}

impl OrderSource for BackendClient {
    fn fetch_order<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, SalesOrder, FetchError> {
        Box::pin(self.get_order(id))
    }
}

impl AgreementSource for BackendClient {
    fn list_agreements(&self) -> BoxFuture<'_, Vec<Agreement>, FetchError> {
        Box::pin(BackendClient::list_agreements(self))
    }
}

impl PaymentBackend for BackendClient {
    fn create_payment_session<'a>(
        &'a self,
        method: PaymentMethod,
        ctx: &'a OrderPaymentContext,
    ) -> BoxFuture<'a, PaymentSessionResponse, FetchError> {
        Box::pin(BackendClient::create_payment_session(self, method, ctx))
    }
}
