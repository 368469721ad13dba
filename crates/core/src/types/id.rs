//! Newtype IDs for Shopify global IDs.
//!
//! Shopify identifies every object with a global ID of the form
//! `gid://shopify/<Resource>/<id>`. Use the `define_gid!` macro to create
//! type-safe wrappers that only accept GIDs of one resource type.

use thiserror::Error;

/// Prefix shared by all Shopify global IDs.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a Shopify global ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The value does not start with `gid://shopify/`.
    #[error("not a Shopify global ID: {0}")]
    NotAGid(String),
    /// The GID names a different resource type.
    #[error("expected a {expected} ID, got {value}")]
    WrongResource {
        /// Resource type the wrapper accepts.
        expected: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The part after the resource type is empty.
    #[error("Shopify global ID has no identifier: {0}")]
    MissingIdentifier(String),
}

/// Check that `value` is a GID for `resource` and return the identifier part.
///
/// # Errors
///
/// Returns an [`IdError`] if the prefix, the resource type or the identifier
/// is missing or wrong.
pub fn parse_gid<'a>(value: &'a str, resource: &'static str) -> Result<&'a str, IdError> {
    let rest = value
        .strip_prefix(GID_PREFIX)
        .ok_or_else(|| IdError::NotAGid(value.to_string()))?;

    let (kind, id) = rest
        .split_once('/')
        .ok_or_else(|| IdError::MissingIdentifier(value.to_string()))?;

    if kind != resource {
        return Err(IdError::WrongResource {
            expected: resource,
            value: value.to_string(),
        });
    }

    // Drop query suffixes such as `?shop=...`, the identifier itself stays opaque
    let id = id.split('?').next().unwrap_or_default();
    if id.is_empty() {
        return Err(IdError::MissingIdentifier(value.to_string()));
    }

    Ok(id)
}

/// Macro to define a type-safe Shopify global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as the plain GID string (validated on input)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()`, `as_str()` and `legacy_id()`
///
/// # Example
///
/// ```rust
/// # use listing_core::define_gid;
/// define_gid!(CollectionId, "Collection");
///
/// let id = CollectionId::parse("gid://shopify/Collection/42").unwrap();
/// assert_eq!(id.legacy_id(), "42");
/// assert!(CollectionId::parse("gid://shopify/Product/42").is_err());
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Shopify resource type accepted by this ID.
            pub const RESOURCE: &'static str = $resource;

            /// Parse a GID string.
            ///
            /// # Errors
            ///
            /// Returns an error if the value is not a GID of this resource type.
            pub fn parse(value: impl Into<String>) -> ::core::result::Result<Self, $crate::IdError> {
                let value = value.into();
                $crate::parse_gid(&value, $resource)?;
                Ok(Self(value))
            }

            /// Get the full GID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the trailing identifier (the numeric ID for most resources).
            #[must_use]
            pub fn legacy_id(&self) -> &str {
                $crate::parse_gid(&self.0, $resource).unwrap_or_default()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_gid!(ProductId, "Product");
define_gid!(VariantId, "ProductVariant");
