//! Responsive image URLs for Shopify CDN images.
//!
//! The Shopify CDN resizes and crops on the fly from query parameters
//! (`width`, `height`, `crop`). Product cards render square images, so every
//! candidate in the `srcset` requests a `width`×`width` center crop.

use url::Url;

use crate::shopify::types::Image;

/// `srcset` candidate widths, in pixels.
const SRCSET_WIDTHS: [u32; 15] = [
    200, 400, 600, 800, 1000, 1200, 1400, 1600, 1800, 2000, 2200, 2400, 2600, 2800, 3000,
];

/// Width used for the `src` fallback.
const DEFAULT_WIDTH: u32 = 400;

/// How the browser should schedule loading an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLoading {
    /// Load immediately (above-the-fold content).
    Eager,
    /// Defer until the image nears the viewport.
    Lazy,
}

impl ImageLoading {
    /// Value for the `loading` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::Lazy => "lazy",
        }
    }
}

/// URL of a square center crop of `src` at `width` pixels.
///
/// Returns `src` unchanged if it is not an absolute URL.
#[must_use]
pub fn square_crop_url(src: &str, width: u32) -> String {
    let Ok(mut url) = Url::parse(src) else {
        return src.to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !matches!(key.as_ref(), "width" | "height" | "crop"))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let width = width.to_string();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("width", &width)
        .append_pair("height", &width)
        .append_pair("crop", "center");

    url.into()
}

/// `srcset` for a square rendering of `image`.
///
/// Candidates wider than the source image are dropped (the CDN does not
/// upscale), keeping at least the smallest one.
#[must_use]
pub fn square_srcset(image: &Image) -> String {
    let max_width = image
        .width
        .and_then(|w| u32::try_from(w).ok())
        .filter(|&w| w > 0)
        .unwrap_or(u32::MAX);

    SRCSET_WIDTHS
        .iter()
        .enumerate()
        .filter(|&(i, &width)| i == 0 || width <= max_width)
        .map(|(_, &width)| format!("{} {width}w", square_crop_url(&image.url, width)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `src` fallback for a square rendering of `image`.
#[must_use]
pub fn square_src(image: &Image) -> String {
    square_crop_url(&image.url, DEFAULT_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str, width: Option<i64>) -> Image {
        Image {
            url: url.to_string(),
            alt_text: None,
            width,
            height: width,
        }
    }

    #[test]
    fn test_square_crop_url_adds_params() {
        assert_eq!(
            square_crop_url("https://cdn.shopify.com/s/files/1/tee.jpg?v=17", 400),
            "https://cdn.shopify.com/s/files/1/tee.jpg?v=17&width=400&height=400&crop=center"
        );
    }

    #[test]
    fn test_square_crop_url_replaces_existing_size() {
        assert_eq!(
            square_crop_url("https://cdn.shopify.com/tee.jpg?width=10&crop=top&v=1", 200),
            "https://cdn.shopify.com/tee.jpg?v=1&width=200&height=200&crop=center"
        );
    }

    #[test]
    fn test_square_crop_url_relative_passthrough() {
        assert_eq!(square_crop_url("/static/tee.jpg", 200), "/static/tee.jpg");
    }

    #[test]
    fn test_srcset_capped_by_intrinsic_width() {
        let srcset = square_srcset(&image("https://cdn.shopify.com/tee.jpg", Some(700)));
        assert_eq!(
            srcset,
            "https://cdn.shopify.com/tee.jpg?width=200&height=200&crop=center 200w, \
             https://cdn.shopify.com/tee.jpg?width=400&height=400&crop=center 400w, \
             https://cdn.shopify.com/tee.jpg?width=600&height=600&crop=center 600w"
        );
    }

    #[test]
    fn test_srcset_keeps_smallest_for_tiny_images() {
        let srcset = square_srcset(&image("https://cdn.shopify.com/tiny.png", Some(50)));
        assert_eq!(srcset.matches("w, ").count(), 0);
        assert!(srcset.ends_with(" 200w"));
    }

    #[test]
    fn test_srcset_unknown_width_uses_all_candidates() {
        let srcset = square_srcset(&image("https://cdn.shopify.com/tee.jpg", None));
        assert_eq!(srcset.split(", ").count(), SRCSET_WIDTHS.len());
    }

    #[test]
    fn test_loading_attribute() {
        assert_eq!(ImageLoading::Eager.as_str(), "eager");
        assert_eq!(ImageLoading::Lazy.as_str(), "lazy");
    }
}
