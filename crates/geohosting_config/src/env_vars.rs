//! Environment variable handling for the GeoHosting checkout front.
//!
//! Configuration values are read from `GEOHOSTING__<SECTION>__<KEY>` variables,
//! secrets from `GEOHOSTING_SECRET_<SECTION>_<KEY>` with a fallback to the
//! provider's conventional name (e.g. `STRIPE_SECRET_KEY`).

use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "GEOHOSTING";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "GEOHOSTING_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value in config files meaning "read this from the environment".
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"server.host"` becomes `"GEOHOSTING__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"stripe.secret_key"` becomes `"GEOHOSTING_SECRET_STRIPE_SECRET_KEY"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to the provider's conventional variable name
///
/// `"paystack.secret_key"` becomes `"PAYSTACK_SECRET_KEY"`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Get an environment variable for a configuration path
pub fn get_config_env_var(path: &str) -> Option<String> {
    let env_var = config_path_to_env_var(path);
    env::var(&env_var).ok()
}

/// Get an environment variable for a secret path, trying the prefixed name first.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    let env_var = secret_path_to_env_var(path);
    if let Ok(value) = env::var(&env_var) {
        return Some(value);
    }

    let legacy_env_var = legacy_secret_path_to_env_var(path);
    env::var(&legacy_env_var).ok()
}

/// Check if a path is a secret path
///
/// Paths containing "secret", "key", "password" or "token" are considered secret.
/// `publishable_key` is public by definition and excluded.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    if path_lower.ends_with("publishable_key") {
        return false;
    }
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
}

/// Get an environment variable for a path, secret or not.
pub fn get_env_var(path: &str) -> Option<String> {
    if is_secret_path(path) {
        get_secret_env_var(path)
    } else {
        get_config_env_var(path)
    }
}

/// Replace every `"secret_from_env"` string in `value` with its environment value.
///
/// Markers without a matching variable become `null`, so optional secrets fall
/// back to `None` on deserialization.
///
/// Returns `true` if any value was replaced.
pub fn inject_env_vars(value: &mut serde_json::Value) -> bool {
    let mut path = Vec::new();
    inject_at(&mut path, value)
}

fn inject_at(path: &mut Vec<String>, value: &mut serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Object(map) => map.iter_mut().fold(false, |replaced, (key, child)| {
            path.push(key.clone());
            let hit = inject_at(path, child);
            path.pop();
            replaced | hit
        }),
        Value::Array(items) => items.iter_mut().enumerate().fold(false, |replaced, (i, child)| {
            path.push(i.to_string());
            let hit = inject_at(path, child);
            path.pop();
            replaced | hit
        }),
        Value::String(s) if s == SECRET_MARKER => {
            let joined = path.join(".");
            match get_env_var(&joined) {
                Some(found) => {
                    *value = Value::String(found);
                    true
                }
                None => {
                    warn!("no environment value for secret {}", joined);
                    *value = Value::Null;
                    false
                }
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(
            config_path_to_env_var("server.host"),
            "GEOHOSTING__SERVER__HOST"
        );
        assert_eq!(
            config_path_to_env_var("backend.base_url"),
            "GEOHOSTING__BACKEND__BASE_URL"
        );
    }

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("stripe.secret_key"),
            "GEOHOSTING_SECRET_STRIPE_SECRET_KEY"
        );
        assert_eq!(
            secret_path_to_env_var("paystack.secret_key"),
            "GEOHOSTING_SECRET_PAYSTACK_SECRET_KEY"
        );
    }

    #[test]
    fn test_legacy_secret_path_to_env_var() {
        assert_eq!(
            legacy_secret_path_to_env_var("stripe.secret_key"),
            "STRIPE_SECRET_KEY"
        );
        assert_eq!(
            legacy_secret_path_to_env_var("paystack.secret_key"),
            "PAYSTACK_SECRET_KEY"
        );
    }

    #[test]
    fn test_is_secret_path() {
        assert!(is_secret_path("stripe.secret_key"));
        assert!(is_secret_path("paystack.secret_key"));
        assert!(!is_secret_path("stripe.publishable_key"));
        assert!(!is_secret_path("server.host"));
        assert!(!is_secret_path("backend.base_url"));
    }

    #[test]
    fn test_inject_env_vars_nulls_missing_secret() {
        let mut value = serde_json::json!({
            "geohosting_test_missing": { "secret_key": SECRET_MARKER }
        });
        let replaced = inject_env_vars(&mut value);
        assert!(!replaced);
        assert!(value["geohosting_test_missing"]["secret_key"].is_null());
    }
}
