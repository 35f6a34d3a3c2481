// --- File: crates/geohosting_checkout/src/validation.rs ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

// App names double as subdomains.
static APP_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]*$").expect("app name pattern compiles"));

pub fn validate_app_name(app_name: &str) -> Result<(), ValidationError> {
    if app_name.is_empty() {
        return Err(ValidationError::new("App name is empty"));
    }
    if !APP_NAME_RE.is_match(app_name) {
        return Err(ValidationError::new(
            "Name may only contain lowercase letters, numbers or dashes.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_name_rules() {
        assert!(validate_app_name("my-geonode-01").is_ok());
        assert_eq!(
            validate_app_name("").unwrap_err().0,
            "App name is empty"
        );
        assert!(validate_app_name("My_App").is_err());
        assert!(validate_app_name("app.example").is_err());
    }
}
