//! Type conversion functions for Shopify Storefront API responses.

pub mod products;

pub use products::convert_product_connection;
