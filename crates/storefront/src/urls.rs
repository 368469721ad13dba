//! Storefront URL helpers.

use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded;

use crate::shopify::types::SelectedOption;

/// Matches a locale path segment such as `/en-us/`.
static LOCALE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/[a-zA-Z]{2}-[a-zA-Z]{2}/").unwrap_or_else(|_| unreachable!("static regex"))
});

/// Matches a whole locale segment value such as `en-us`.
static LOCALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]{2}-[a-zA-Z]{2}$").unwrap_or_else(|_| unreachable!("static regex"))
});

/// Whether `segment` is a locale path segment (`en-us`, `FR-ca`, ...).
#[must_use]
pub fn is_locale_segment(segment: &str) -> bool {
    LOCALE.is_match(segment)
}

/// URL of the product detail page with a variant preselected.
///
/// The path keeps the locale prefix of `current_path` when it has one, and the
/// variant's options become query parameters:
///
/// ```text
/// variant_url("tee", [Size=M, Color=Ocean Blue], "/en-ca/products")
///   == "/en-ca/products/tee?Size=M&Color=Ocean+Blue"
/// ```
///
/// An option name that appears twice keeps its first position and the last
/// value.
#[must_use]
pub fn variant_url(handle: &str, selected_options: &[SelectedOption], current_path: &str) -> String {
    let path = LOCALE_SEGMENT.find(current_path).map_or_else(
        || format!("/products/{handle}"),
        |locale| format!("{}products/{handle}", locale.as_str()),
    );

    let mut params: Vec<(&str, &str)> = Vec::with_capacity(selected_options.len());
    for option in selected_options {
        match params.iter_mut().find(|(name, _)| *name == option.name) {
            Some(existing) => existing.1 = option.value.as_str(),
            None => params.push((option.name.as_str(), option.value.as_str())),
        }
    }

    if params.is_empty() {
        return path;
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(name: &str, value: &str) -> SelectedOption {
        SelectedOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_variant_url_without_options() {
        assert_eq!(variant_url("glow-oil", &[], "/products"), "/products/glow-oil");
    }

    #[test]
    fn test_variant_url_with_options() {
        let options = [option("Size", "M"), option("Color", "Ocean Blue")];
        assert_eq!(
            variant_url("tee", &options, "/products"),
            "/products/tee?Size=M&Color=Ocean+Blue"
        );
    }

    #[test]
    fn test_variant_url_encodes_reserved_characters() {
        let options = [option("Pack", "2 & 4"), option("Scent", "Piña/Colada")];
        assert_eq!(
            variant_url("oil", &options, "/products"),
            "/products/oil?Pack=2+%26+4&Scent=Pi%C3%B1a%2FColada"
        );
    }

    #[test]
    fn test_variant_url_keeps_locale_prefix() {
        let options = [option("Title", "Default Title")];
        assert_eq!(
            variant_url("tee", &options, "/en-ca/products"),
            "/en-ca/products/tee?Title=Default+Title"
        );
    }

    #[test]
    fn test_variant_url_ignores_non_locale_segments() {
        assert_eq!(variant_url("tee", &[], "/shop/products"), "/products/tee");
        assert_eq!(variant_url("tee", &[], "/eng-us/products"), "/products/tee");
    }

    #[test]
    fn test_variant_url_duplicate_option_last_value_wins() {
        let options = [
            option("Size", "S"),
            option("Color", "Red"),
            option("Size", "L"),
        ];
        assert_eq!(
            variant_url("tee", &options, "/products"),
            "/products/tee?Size=L&Color=Red"
        );
    }

    #[test]
    fn test_is_locale_segment() {
        assert!(is_locale_segment("en-us"));
        assert!(is_locale_segment("FR-ca"));
        assert!(!is_locale_segment("products"));
        assert!(!is_locale_segment("en-usa"));
    }
}
