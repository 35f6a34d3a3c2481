// File: services/geohosting_front/src/lib.rs
use axum::Router;
use geohosting_checkout::{
    page_routes, routes as checkout_routes, BackendClient, CheckoutState, IpApiLookup,
    PaymentProviders,
};
use geohosting_common::GeohostingError;
use geohosting_config::AppConfig;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Registers the payment adapters that are both compiled in and enabled.
pub fn payment_providers(config: &AppConfig) -> PaymentProviders {
    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut providers = PaymentProviders::new();

    #[cfg(feature = "stripe")]
    if geohosting_common::is_stripe_enabled(config) {
        if let Some(stripe) = config.stripe.clone() {
            info!("Stripe payments enabled");
            providers = providers.with_provider(Arc::new(
                geohosting_stripe::StripePaymentProvider::new(stripe),
            ));
        }
    }

    #[cfg(feature = "paystack")]
    if geohosting_common::is_paystack_enabled(config) {
        if let Some(paystack) = config.paystack.clone() {
            info!("Paystack payments enabled");
            providers = providers.with_provider(Arc::new(
                geohosting_paystack::PaystackPaymentProvider::new(paystack),
            ));
        }
    }

    #[cfg(not(any(feature = "stripe", feature = "paystack")))]
    let _ = config;

    providers
}

/// Builds the full application router from configuration.
pub fn app(config: Arc<AppConfig>) -> Result<Router, GeohostingError> {
    let backend = BackendClient::new(&config.backend)?;
    let lookup = Arc::new(IpApiLookup::new(config.location.lookup_url.clone()));
    let providers = payment_providers(&config);
    let state = Arc::new(CheckoutState::new(config, backend, providers, lookup));

    #[allow(unused_mut)] // for the openapi feature it needs to be mutable
    let mut app = Router::new()
        .merge(geohosting_common::routes())
        .merge(page_routes(state.clone()))
        .nest("/api", checkout_routes(state));

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use geohosting_checkout::doc::CheckoutApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "GeoHosting Checkout API",
                version = "0.1.0",
                description = "Checkout routing, agreements and payment for GeoHosting orders",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(CheckoutApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}
