//! Feature flag handling.
//!
//! Payment providers are switched on twice: at compile time with the
//! `stripe` / `paystack` cargo features, and at runtime with the
//! `use_stripe` / `use_paystack` config flags plus their config sections.

#[cfg(any(feature = "stripe", feature = "paystack"))]
use geohosting_config::AppConfig;

/// A feature is enabled when its flag is set and its section is present.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

#[cfg(feature = "stripe")]
pub fn is_stripe_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_stripe, config.stripe.as_ref())
}

#[cfg(feature = "paystack")]
pub fn is_paystack_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_paystack, config.paystack.as_ref())
}
