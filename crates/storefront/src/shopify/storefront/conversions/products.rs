//! Product type conversion functions.

use chrono::{DateTime, Utc};
use listing_core::{CurrencyCode, Price, ProductId, VariantId};

use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Image, PageInfo, Product, ProductConnection, ProductVariant, SelectedOption, VariantProduct,
};

use super::super::queries::all_products;

// =============================================================================
// all_products conversions
// =============================================================================

/// Convert the `products` field of an `AllProducts` response.
///
/// # Errors
///
/// Returns `ShopifyError::InvalidResponse` if an ID, timestamp or price in
/// the response is malformed.
pub fn convert_product_connection(
    conn: all_products::AllProductsProducts,
) -> Result<ProductConnection, ShopifyError> {
    Ok(ProductConnection {
        nodes: conn
            .nodes
            .into_iter()
            .map(convert_product_card)
            .collect::<Result<_, _>>()?,
        page_info: PageInfo {
            has_next_page: conn.page_info.has_next_page,
            has_previous_page: conn.page_info.has_previous_page,
            start_cursor: conn.page_info.start_cursor,
            end_cursor: conn.page_info.end_cursor,
        },
    })
}

fn convert_product_card(card: all_products::ProductCard) -> Result<Product, ShopifyError> {
    Ok(Product {
        id: ProductId::parse(card.id).map_err(invalid)?,
        published_at: parse_timestamp(&card.published_at)?,
        title: card.title,
        handle: card.handle,
        vendor: card.vendor,
        variants: card
            .variants
            .nodes
            .into_iter()
            .map(convert_variant)
            .collect::<Result<_, _>>()?,
    })
}

fn convert_variant(
    v: all_products::ProductCardVariantsNodes,
) -> Result<ProductVariant, ShopifyError> {
    Ok(ProductVariant {
        id: VariantId::parse(v.id).map_err(invalid)?,
        image: v.image.map(|i| Image {
            url: i.url,
            alt_text: i.alt_text,
            width: i.width,
            height: i.height,
        }),
        price: convert_money(&v.price.amount, v.price.currency_code)?,
        compare_at_price: v
            .compare_at_price
            .map(|p| convert_money(&p.amount, p.currency_code))
            .transpose()?,
        selected_options: v
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        product: VariantProduct {
            handle: v.product.handle,
            title: v.product.title,
        },
    })
}

fn convert_money(amount: &str, currency_code: CurrencyCode) -> Result<Price, ShopifyError> {
    Price::parse(amount, currency_code.as_str()).map_err(invalid)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ShopifyError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ShopifyError::InvalidResponse(format!("timestamp {value:?}: {e}")))
}

fn invalid(err: impl std::fmt::Display) -> ShopifyError {
    ShopifyError::InvalidResponse(err.to_string())
}
