// --- File: crates/geohosting_checkout/src/handlers_test.rs ---
#[cfg(test)]
mod tests {
    use crate::handlers::client_ip;
    use axum::http::{HeaderMap, HeaderValue};
    use std::net::IpAddr;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_client_ip_takes_first_forwarded_address() {
        let ip = client_ip(&headers(&[("x-forwarded-for", " 196.25.1.1 , 10.0.0.1")]));
        assert_eq!(ip, Some("196.25.1.1".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let ip = client_ip(&headers(&[
            ("x-forwarded-for", "../../admin"),
            ("x-real-ip", "2001:db8::7"),
        ]));
        assert_eq!(ip, Some("2001:db8::7".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn test_client_ip_drops_malformed_values() {
        assert_eq!(client_ip(&headers(&[("x-forwarded-for", "1.2.3.4/json/?")])), None);
        assert_eq!(client_ip(&headers(&[("x-real-ip", "")])), None);
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
