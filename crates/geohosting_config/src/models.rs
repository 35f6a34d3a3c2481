// --- File: crates/geohosting_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Backend API Config ---
// The GeoHosting REST backend that owns orders and agreements.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub base_url: String, // e.g. https://geohosting.example.com (no trailing /api)
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_timeout() -> u64 {
    30
}

// --- Checkout Flow Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CheckoutConfig {
    /// Seconds between order refreshes while waiting for deployment.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Country assumed when the location lookup is unavailable.
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Upper bound for one deployment wait request.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
    /// How long per-session state (payment method, draft, open payment) is kept.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Most sessions tracked at once; the oldest entry is evicted beyond this.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_country() -> String {
    "US".to_string()
}

fn default_wait_timeout() -> u64 {
    60
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    10_000
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            default_country: default_country(),
            wait_timeout_secs: default_wait_timeout(),
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

// --- Location Lookup Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocationConfig {
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,
}

fn default_lookup_url() -> String {
    "https://ipapi.co".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            lookup_url: default_lookup_url(),
        }
    }
}

// --- Stripe Config ---
// Publishable key is handed to the embedded checkout. Secret key is optional and
// only used to confirm a finished session.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    pub publishable_key: String, // Mandatory
    #[serde(default)]
    pub secret_key: Option<String>, // "secret_from_env" -> GEOHOSTING_SECRET_STRIPE_SECRET_KEY or STRIPE_SECRET_KEY
    #[serde(default = "default_stripe_api_base")]
    pub api_base_url: String,
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_string()
}

// --- Paystack Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaystackConfig {
    #[serde(default = "default_paystack_checkout")]
    pub checkout_base_url: String,
    #[serde(default)]
    pub secret_key: Option<String>, // "secret_from_env" -> GEOHOSTING_SECRET_PAYSTACK_SECRET_KEY or PAYSTACK_SECRET_KEY
    #[serde(default = "default_paystack_api_base")]
    pub api_base_url: String,
}

fn default_paystack_checkout() -> String {
    "https://checkout.paystack.com".to_string()
}

fn default_paystack_api_base() -> String {
    "https://api.paystack.co".to_string()
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server and backend config are mandatory
    pub server: ServerConfig,
    pub backend: BackendConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,
    #[serde(default)]
    pub use_paystack: bool,

    // --- Optional Provider Configurations ---
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub paystack: Option<PaystackConfig>,
}
