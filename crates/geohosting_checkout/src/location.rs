// --- File: crates/geohosting_checkout/src/location.rs ---
use geohosting_common::{BoxFuture, HTTP_CLIENT};
use serde::Deserialize;
use std::net::IpAddr;
use tracing::debug;

use crate::error::FetchError;

/// Coarse buyer location: ISO country code only.
pub trait LocationLookup: Send + Sync {
    fn country_code<'a>(&'a self, client_ip: Option<&'a str>) -> BoxFuture<'a, String, FetchError>;
}

/// ipapi.co style lookup: `{base}/json/` or `{base}/{ip}/json/`.
pub struct IpApiLookup {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    country_code: Option<String>,
}

impl IpApiLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Anything that is not an IP address falls back to the caller's own location.
    fn url(&self, client_ip: Option<&str>) -> String {
        let base = self.base_url.trim_end_matches('/');
        match client_ip.and_then(|ip| ip.trim().parse::<IpAddr>().ok()) {
            Some(ip) => format!("{base}/{ip}/json/"),
            None => format!("{base}/json/"),
        }
    }
}

impl LocationLookup for IpApiLookup {
    fn country_code<'a>(&'a self, client_ip: Option<&'a str>) -> BoxFuture<'a, String, FetchError> {
        Box::pin(async move {
            let url = self.url(client_ip);
            debug!(url = %url, "Looking up buyer location");
            let response = HTTP_CLIENT
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message: "location lookup failed".to_string(),
                });
            }
            let body: LocationResponse = response
                .json()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()))?;
            body.country_code
                .filter(|code| !code.is_empty())
                .ok_or_else(|| FetchError::Decode("response has no country_code".to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_embeds_only_ip_addresses() {
        let lookup = IpApiLookup::new("https://ipapi.co/");
        assert_eq!(lookup.url(None), "https://ipapi.co/json/");
        assert_eq!(lookup.url(Some("196.25.1.1")), "https://ipapi.co/196.25.1.1/json/");
        assert_eq!(lookup.url(Some("2001:db8::1")), "https://ipapi.co/2001:db8::1/json/");
        assert_eq!(lookup.url(Some("../admin?x=")), "https://ipapi.co/json/");
        assert_eq!(lookup.url(Some("1.2.3.4/../../x")), "https://ipapi.co/json/");
    }

    #[tokio::test]
    async fn test_invalid_ip_is_not_sent_upstream() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/json/"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "country_code": "ZA" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let lookup = IpApiLookup::new(server.uri());
        let code = lookup.country_code(Some("evil/path")).await.unwrap();
        assert_eq!(code, "ZA");
    }
}
