//! Integration test helpers for the product listing storefront.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`
//! while a `wiremock` server stands in for the Shopify Storefront API, so no
//! network access or Shopify credentials are needed.
//!
//! ```bash
//! cargo test -p listing-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use listing_storefront::config::{ShopifyStorefrontConfig, StorefrontConfig};
use listing_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

/// API version used in the mocked endpoint path.
pub const API_VERSION: &str = "2026-01";

/// Path of the mocked GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "/api/2026-01/graphql.json";

/// Private token the storefront sends to the mock.
pub const TEST_TOKEN: &str = "shpat_integration_Zq83LmV0xRt6";

/// Storefront configuration pointing at `mock_uri`.
#[must_use]
pub fn test_config(mock_uri: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        shopify: ShopifyStorefrontConfig {
            store: "test-shop.myshopify.com".to_string(),
            api_version: API_VERSION.to_string(),
            storefront_private_token: SecretString::from(TEST_TOKEN.to_string()),
            endpoint_override: Some(format!("{mock_uri}{GRAPHQL_PATH}")),
            cache_ttl: Duration::from_secs(60),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Storefront router backed by the mock at `mock_uri`.
#[must_use]
pub fn test_app(mock_uri: &str) -> Router {
    listing_storefront::app(AppState::new(test_config(mock_uri)))
}

/// Response status, headers and body as text.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

/// Send a GET to `app` with extra `headers`.
///
/// # Panics
///
/// Panics if the request cannot be built or the router fails.
pub async fn get(app: Router, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let response = app
        .oneshot(builder.body(Body::empty()).expect("valid request"))
        .await
        .expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// One `ProductCard` node as the Storefront API returns it.
#[must_use]
pub fn product_node(n: usize) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{}", 7000 + n),
        "title": format!("Sunscreen {n}"),
        "publishedAt": "2025-06-01T12:00:00Z",
        "handle": format!("sunscreen-{n}"),
        "vendor": "Tidewater Goods",
        "variants": { "nodes": [{
            "id": format!("gid://shopify/ProductVariant/{}", 9000 + n),
            "image": {
                "url": format!("https://cdn.shopify.com/s/files/1/sunscreen-{n}.jpg"),
                "altText": null,
                "width": 1600,
                "height": 1600
            },
            "price": { "amount": "24.0", "currencyCode": "USD" },
            "compareAtPrice": null,
            "selectedOptions": [{ "name": "Size", "value": "100ml" }],
            "product": { "handle": format!("sunscreen-{n}"), "title": format!("Sunscreen {n}") }
        }]}
    })
}

/// A successful `AllProducts` response body.
#[must_use]
pub fn products_response(nodes: Vec<Value>, page_info: Value) -> Value {
    json!({
        "data": {
            "products": {
                "nodes": nodes,
                "pageInfo": page_info
            }
        }
    })
}

/// `pageInfo` with both cursors set.
#[must_use]
pub fn page_info(has_previous: bool, has_next: bool) -> Value {
    json!({
        "hasPreviousPage": has_previous,
        "hasNextPage": has_next,
        "startCursor": "cursor-start",
        "endCursor": "cursor-end"
    })
}
