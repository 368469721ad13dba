//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` query types with `reqwest` 0.13 for HTTP.
//! Caches product pages using `moka` (5-minute TTL by default).

mod conversions;

pub mod queries;

use std::sync::Arc;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::pagination::PaginationVariables;
use crate::shopify::{GraphQLError, ShopifyError};
use crate::shopify::types::ProductConnection;

use conversions::convert_product_connection;
use queries::AllProducts;

/// Maximum number of cached product pages.
const CACHE_CAPACITY: u64 = 1000;

/// Private access tokens use a different header than public tokens.
/// See: https://shopify.dev/docs/storefronts/headless/building-with-the-storefront-api/getting-started
const PRIVATE_TOKEN_HEADER: &str = "Shopify-Storefront-Private-Token";

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and the page cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    products: Cache<PaginationVariables, ProductConnection>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.graphql_endpoint(),
                access_token: config.storefront_private_token.clone(),
                products,
            }),
        }
    }

    /// Execute a GraphQL query.
    #[instrument(skip_all, fields(operation = tracing::field::Empty))]
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);
        tracing::Span::current().record("operation", request_body.operation_name);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(PRIVATE_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            tracing::warn!(retry_after, "Shopify rate limit hit");
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first so failures can log what Shopify sent
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body_excerpt(&body, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::from_message(
                format!("HTTP {status}: {}", body_excerpt(&body, 200)),
            )]));
        }

        let response: Response<Q::ResponseData> =
            serde_json::from_str(&body).map_err(|e| {
                tracing::error!(
                    error = %e,
                    body = %body_excerpt(&body, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                ShopifyError::Parse(e)
            })?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %body_excerpt(&body, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![GraphQLError::from_message("No data in response")])
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get one page of products shaped by the `ProductCard` fragment.
    ///
    /// Pages are cached per set of pagination variables, so requesting the
    /// same cursor twice within the TTL returns the same page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response cannot be
    /// converted into domain types.
    #[instrument(skip(self), fields(direction = ?variables.direction()))]
    pub async fn get_all_products(
        &self,
        variables: &PaginationVariables,
    ) -> Result<ProductConnection, ShopifyError> {
        if let Some(connection) = self.inner.products.get(variables).await {
            debug!("Cache hit for products page");
            return Ok(connection);
        }

        let data = self.execute::<AllProducts>(variables.into()).await?;
        let connection = convert_product_connection(data.products)?;

        debug!(
            count = connection.nodes.len(),
            has_next_page = connection.page_info.has_next_page,
            has_previous_page = connection.page_info.has_previous_page,
            "Fetched products page"
        );

        self.inner
            .products
            .insert(variables.clone(), connection.clone())
            .await;

        Ok(connection)
    }
}

/// First `max_chars` characters of a response body, for logs and errors.
fn body_excerpt(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
