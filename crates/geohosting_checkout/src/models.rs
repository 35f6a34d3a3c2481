// --- File: crates/geohosting_checkout/src/models.rs ---
//! Wire models for sales orders and agreements as served by the backend.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque order identifier. The backend sends it as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        OrderId(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        OrderId(value)
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        OrderId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(OrderId)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) => s,
        StringOrNumber::Int(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }),
    )
}

/// Server-driven lifecycle of an order. Moves forward only.
///
/// Strings the client does not know are kept verbatim in `Unknown` so the
/// router can leave the user where they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    WaitingPayment,
    WaitingConfiguration,
    WaitingDeployment,
    Deployed,
    Unknown(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::WaitingPayment => "Waiting Payment",
            OrderStatus::WaitingConfiguration => "Waiting Configuration",
            OrderStatus::WaitingDeployment => "Waiting Deployment",
            OrderStatus::Deployed => "Deployed",
            OrderStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, OrderStatus::Unknown(_))
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Waiting Payment" => OrderStatus::WaitingPayment,
            "Waiting Configuration" => OrderStatus::WaitingConfiguration,
            "Waiting Deployment" => OrderStatus::WaitingDeployment,
            "Deployed" => OrderStatus::Deployed,
            _ => OrderStatus::Unknown(value),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        OrderStatus::from(value.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Catalog references are display-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub feature_list: Option<serde_json::Value>,
    #[serde(default)]
    pub package_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A purchase of a product package, as returned by `GET /api/orders/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub id: OrderId,
    pub order_status: OrderStatus,
    /// Empty until configuration completes.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub app_name: String,
    // Product and package may be sent as bare ids on list endpoints.
    #[serde(default, deserialize_with = "lenient")]
    pub product: Option<Product>,
    #[serde(default, deserialize_with = "lenient")]
    pub package: Option<Package>,
    #[serde(default)]
    pub invoice_url: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub erpnext_code: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub instance: Option<Instance>,
}

impl SalesOrder {
    pub fn has_app_name(&self) -> bool {
        !self.app_name.trim().is_empty()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts the nested object, `null`, or anything else (e.g. a bare id) as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A legal document that must be accepted before payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: u64,
    pub name: String,
    pub template: String,
    /// Client-side only until submission.
    #[serde(default)]
    pub signed: bool,
}

/// The agreements endpoint may answer with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AgreementList {
    Plain(Vec<Agreement>),
    Paged { results: Vec<Agreement> },
}

impl From<AgreementList> for Vec<Agreement> {
    fn from(list: AgreementList) -> Self {
        match list {
            AgreementList::Plain(items) => items,
            AgreementList::Paged { results } => results,
        }
    }
}

/// Body returned by `POST /api/orders/{id}/payment/{method}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSessionResponse {
    pub key: String,
    pub success_url: String,
}
