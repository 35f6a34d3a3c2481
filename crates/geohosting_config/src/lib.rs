// --- File: crates/geohosting_config/src/lib.rs ---
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Loads the layered application configuration.
///
/// Sources, later ones winning:
/// 1. `<config dir>/default.{toml,yaml,json}`
/// 2. `<config dir>/<RUN_ENV>.{toml,yaml,json}` (`RUN_ENV` defaults to `debug`)
/// 3. `GEOHOSTING__SECTION__KEY` environment variables
///
/// The config dir is `GEOHOSTING_CONFIG_DIR`, or `./config`.
/// Values set to `"secret_from_env"` are then resolved from the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let config_dir = env::var("GEOHOSTING_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    debug!(
        "loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Parses a configuration from a TOML string, resolving secret markers.
///
/// Used by tests and tools that embed their configuration.
pub fn config_from_toml(source: &str) -> Result<AppConfig, ConfigError> {
    let raw_config: AppConfig = Config::builder()
        .add_source(File::from_str(source, config::FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("config is not serializable: {err}")))?;
    env_vars::inject_env_vars(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("config invalid after secret injection: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures the dotenv file is loaded into the process environment exactly once.
///
/// The file is `DOTENV_OVERRIDE` if set, else the first CLI argument when it
/// starts with `.env`, else `.env`. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [backend]
        base_url = "http://localhost:8000"
    "#;

    #[test]
    fn test_minimal_config_applies_defaults() {
        let config = config_from_toml(MINIMAL).expect("minimal config should parse");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.checkout.poll_interval_secs, 5);
        assert_eq!(config.checkout.default_country, "US");
        assert_eq!(config.checkout.session_ttl_secs, 3600);
        assert_eq!(config.checkout.max_sessions, 10_000);
        assert_eq!(config.location.lookup_url, "https://ipapi.co");
        assert!(!config.use_stripe);
        assert!(config.stripe.is_none());
    }

    #[test]
    fn test_missing_secret_becomes_none() {
        let source = format!(
            "use_paystack = true\n{}\n[paystack]\nsecret_key = \"secret_from_env\"\n",
            MINIMAL
        );
        // Only meaningful when neither variable is set in the test environment.
        if env::var("GEOHOSTING_SECRET_PAYSTACK_SECRET_KEY").is_err()
            && env::var("PAYSTACK_SECRET_KEY").is_err()
        {
            let config = config_from_toml(&source).expect("config should parse");
            let paystack = config.paystack.expect("paystack section present");
            assert!(paystack.secret_key.is_none());
            assert_eq!(paystack.checkout_base_url, "https://checkout.paystack.com");
        }
    }
}
