//! GraphQL query definitions for Shopify Storefront API.
//!
//! Types are generated from the query documents in `graphql/storefront/queries/`
//! against the schema subset in `graphql/storefront/schema.graphql`.

use graphql_client::GraphQLQuery;
use listing_core::CurrencyCode;

use crate::pagination::PaginationVariables;

// Scalar types for Shopify GraphQL schema
// Must be defined in the same module where GraphQLQuery derive is used
// Note: These MUST match the GraphQL schema scalar names exactly (uppercase)
#[allow(clippy::upper_case_acronyms)]
type DateTime = String;
#[allow(clippy::upper_case_acronyms)]
type Decimal = String;
#[allow(clippy::upper_case_acronyms)]
type URL = String;

// Product queries
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/storefront/schema.graphql",
    query_path = "graphql/storefront/queries/products.graphql",
    extern_enums("CurrencyCode"),
    response_derives = "Debug, Clone",
    variables_derives = "Debug, Clone"
)]
pub struct AllProducts;

impl From<&PaginationVariables> for all_products::Variables {
    fn from(vars: &PaginationVariables) -> Self {
        Self {
            first: vars.first,
            last: vars.last,
            start_cursor: vars.start_cursor.clone(),
            end_cursor: vars.end_cursor.clone(),
        }
    }
}
