use http::Method;
use http::header::{HeaderName, HeaderValue};
use relay_config::{AllowList, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer from configuration
///
/// Wildcards cannot be combined with credentials, so with `credentials`
/// enabled a wildcard mirrors the request instead.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mirror = config.credentials;

    let origins = match &config.origins {
        AllowList::Any if mirror => AllowOrigin::mirror_request(),
        AllowList::Any => AllowOrigin::any(),
        AllowList::Only(origins) => AllowOrigin::list(parse_all::<HeaderValue>(origins, "origin")),
    };

    let methods = match &config.methods {
        AllowList::Any if mirror => AllowMethods::mirror_request(),
        AllowList::Any => AllowMethods::any(),
        AllowList::Only(methods) => AllowMethods::list(parse_all::<Method>(methods, "method")),
    };

    let headers = match &config.headers {
        AllowList::Any if mirror => AllowHeaders::mirror_request(),
        AllowList::Any => AllowHeaders::any(),
        AllowList::Only(headers) => AllowHeaders::list(parse_all::<HeaderName>(headers, "header")),
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.credentials);

    if let Some(max_age) = config.max_age {
        layer = layer.max_age(max_age);
    }

    layer
}

/// Parse every value, dropping (and logging) the ones that are not valid
fn parse_all<T: std::str::FromStr>(values: &[String], kind: &'static str) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::warn!(kind, value = %value, "ignoring invalid CORS entry");
            }
            parsed
        })
        .collect()
}
