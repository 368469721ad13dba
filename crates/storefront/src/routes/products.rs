//! Product listing route handlers.
//!
//! The listing pages through the catalog four products at a time using the
//! Storefront API's cursor connection. Loaded pages accumulate in one grid:
//! "Load next products" appends a page, "Load previous products" prepends
//! one. A single handler serves every representation of a page:
//!
//! - the full HTML page,
//! - the listing (controls + grid) for HTMX requests without a cursor,
//! - one page of grid items plus out-of-band control updates for the load
//!   controls,
//! - the raw `{ "products": ... }` payload for JSON clients.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::image::{ImageLoading, square_src, square_srcset};
use crate::pagination::{Direction, PageLinks, PaginationQuery, PaginationVariables};
use crate::shopify::types::{Product, ProductConnection};
use crate::state::AppState;
use crate::urls::{is_locale_segment, variant_url};

/// Products per page.
pub const PAGE_BY: i64 = 4;

/// Grid positions below this load their image eagerly.
const EAGER_IMAGE_COUNT: usize = 8;

/// `sizes` attribute for product card images.
const IMAGE_SIZES: &str = "(min-width: 45em) 400px, 100vw";

/// Request headers that select the representation.
const VARY_HEADERS: &str = "Accept, HX-Request, HX-History-Restore-Request";

// =============================================================================
// View models
// =============================================================================

/// Image display data for a product card.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub src: String,
    pub srcset: String,
    pub sizes: &'static str,
    pub alt: String,
    pub loading: &'static str,
}

/// One product card in the grid.
#[derive(Debug, Clone)]
pub struct ProductItemView {
    pub href: String,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image: Option<ImageView>,
}

/// A "Load previous products" / "Load next products" control.
///
/// Without an `href` the control renders disabled.
#[derive(Debug, Clone)]
pub struct PaginationControl {
    pub id: &'static str,
    pub label: &'static str,
    pub href: Option<String>,
    /// Where a loaded page goes in the grid (`afterbegin` / `beforeend`).
    pub swap: &'static str,
    /// Replace the control already on the page (`hx-swap-oob`).
    pub oob: bool,
}

impl PaginationControl {
    fn new(direction: Direction, href: Option<String>) -> Self {
        match direction {
            Direction::Previous => Self {
                id: "load-previous",
                label: "Load previous products",
                href,
                swap: "afterbegin",
                oob: false,
            },
            Direction::Next => Self {
                id: "load-next",
                label: "Load next products",
                href,
                swap: "beforeend",
                oob: false,
            },
        }
    }

    const fn out_of_band(mut self) -> Self {
        self.oob = true;
        self
    }
}

/// One loaded page: its grid items and both controls.
#[derive(Debug, Clone)]
pub struct ListingView {
    pub items: Vec<ProductItemView>,
    pub previous: PaginationControl,
    pub next: PaginationControl,
}

impl ListingView {
    /// Build the listing for `connection` as seen from `path?raw_query`.
    ///
    /// `first_position` is the grid index of the page's first item; images
    /// load eagerly for the first eight grid positions.
    #[must_use]
    pub fn new(
        connection: &ProductConnection,
        path: &str,
        raw_query: Option<&str>,
        first_position: usize,
    ) -> Self {
        let items = connection
            .nodes
            .iter()
            .filter_map(|product| {
                let item = ProductItemView::from_product(product, path);
                if item.is_none() {
                    warn!(handle = %product.handle, "Skipping product without variants");
                }
                item
            })
            .enumerate()
            .map(|(index, mut item)| {
                if first_position + index >= EAGER_IMAGE_COUNT
                    && let Some(image) = item.image.as_mut()
                {
                    image.loading = ImageLoading::Lazy.as_str();
                }
                item
            })
            .collect();

        let links = PageLinks::new(path, raw_query, &connection.page_info);

        Self {
            items,
            previous: PaginationControl::new(Direction::Previous, links.previous),
            next: PaginationControl::new(Direction::Next, links.next),
        }
    }
}

impl ProductItemView {
    /// Card for `product`, linking to its first variant.
    ///
    /// Returns `None` for a product with no variants. Images start out eager;
    /// the listing switches them to lazy by grid position.
    fn from_product(product: &Product, current_path: &str) -> Option<Self> {
        let variant = product.first_variant()?;

        let image = variant.image.as_ref().map(|image| ImageView {
            src: square_src(image),
            srcset: square_srcset(image),
            sizes: IMAGE_SIZES,
            alt: image
                .alt_text
                .clone()
                .filter(|alt| !alt.trim().is_empty())
                .unwrap_or_else(|| product.title.clone()),
            loading: ImageLoading::Eager.as_str(),
        });

        Some(Self {
            href: variant_url(&product.handle, &variant.selected_options, current_path),
            title: product.title.clone(),
            price: variant.price.display(),
            compare_at_price: variant
                .compare_at_price
                .filter(|_| variant.is_on_sale())
                .map(|price| price.display()),
            image,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub listing: ListingView,
    /// Items in the grid.
    pub loaded: usize,
}

/// Listing fragment (controls + grid) for HTMX requests.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_listing.html")]
pub struct ProductListingFragment {
    pub listing: ListingView,
    pub loaded: usize,
}

/// One page of grid items for a load control, with the control that issued
/// the request and the loaded counter updated out of band.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_page.html")]
pub struct ProductPageFragment {
    pub items: Vec<ProductItemView>,
    pub control: PaginationControl,
    pub loaded: usize,
}

/// JSON representation of a listing page.
#[derive(Debug, Serialize)]
pub struct ProductsPayload {
    pub products: ProductConnection,
}

/// Representation requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseMode {
    Page,
    Fragment,
    Json,
}

impl ResponseMode {
    fn from_headers(headers: &HeaderMap) -> Self {
        let accepts_json = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"));

        // htmx restoring history on a cache miss needs the whole page
        if accepts_json {
            Self::Json
        } else if header_is_true(headers, "hx-request")
            && !header_is_true(headers, "hx-history-restore-request")
        {
            Self::Fragment
        } else {
            Self::Page
        }
    }
}

fn header_is_true(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing.
pub async fn index(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response> {
    render_listing(&state, &uri, &headers).await
}

/// Display the product listing under a locale prefix (`/en-ca/products`).
pub async fn locale_index(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response> {
    if !is_locale_segment(&locale) {
        return Err(AppError::NotFound(uri.path().to_string()));
    }

    render_listing(&state, &uri, &headers).await
}

/// Load one page of products for the pagination parameters in the query.
///
/// # Errors
///
/// Returns `AppError::Shopify` if the Storefront API request fails.
pub async fn load_products(
    state: &AppState,
    query: &PaginationQuery,
) -> Result<ProductConnection> {
    if query.cursor.is_some() {
        add_breadcrumb(
            "navigation",
            "Paged product listing",
            Some(&[("direction", query.direction.as_str())]),
        );
    }

    let variables = PaginationVariables::from_query(query, PAGE_BY);
    Ok(state.storefront().get_all_products(&variables).await?)
}

#[instrument(skip_all, fields(path = %uri.path()))]
async fn render_listing(state: &AppState, uri: &Uri, headers: &HeaderMap) -> Result<Response> {
    let query = PaginationQuery::from_raw(uri.query());
    let connection = load_products(state, &query).await?;
    let mode = ResponseMode::from_headers(headers);
    debug!(?mode, count = connection.nodes.len(), "Rendering product listing");

    let mut response = match mode {
        ResponseMode::Json => Json(ProductsPayload {
            products: connection,
        })
        .into_response(),
        ResponseMode::Fragment if query.cursor.is_some() => {
            page_fragment(&connection, uri, query.direction).into_response()
        }
        ResponseMode::Fragment => {
            let listing = ListingView::new(&connection, uri.path(), uri.query(), 0);
            ProductListingFragment {
                loaded: listing.items.len(),
                listing,
            }
            .into_response()
        }
        ResponseMode::Page => {
            let listing = ListingView::new(&connection, uri.path(), uri.query(), 0);
            ProductsIndexTemplate {
                loaded: listing.items.len(),
                listing,
            }
            .into_response()
        }
    };

    response
        .headers_mut()
        .insert(header::VARY, HeaderValue::from_static(VARY_HEADERS));

    Ok(response)
}

/// Grid items for a load control request.
///
/// Next pages are appended after the `loaded` items already in the grid;
/// previous pages are prepended and start at position 0.
fn page_fragment(
    connection: &ProductConnection,
    uri: &Uri,
    direction: Direction,
) -> ProductPageFragment {
    let loaded = PaginationQuery::loaded(uri.query());
    let first_position = match direction {
        Direction::Next => loaded,
        Direction::Previous => 0,
    };

    let listing = ListingView::new(connection, uri.path(), uri.query(), first_position);
    let control = match direction {
        Direction::Next => listing.next,
        Direction::Previous => listing.previous,
    };

    ProductPageFragment {
        loaded: loaded + listing.items.len(),
        items: listing.items,
        control: control.out_of_band(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use listing_core::{Price, ProductId, VariantId};

    use super::*;
    use crate::shopify::types::{
        Image, PageInfo, ProductVariant, SelectedOption, VariantProduct,
    };

    fn variant(handle: &str, n: usize, image: Option<Image>) -> ProductVariant {
        ProductVariant {
            id: VariantId::parse(format!("gid://shopify/ProductVariant/{}", 500 + n)).unwrap(),
            image,
            price: Price::parse("18.0", "USD").unwrap(),
            compare_at_price: None,
            selected_options: vec![SelectedOption {
                name: "Size".to_string(),
                value: "50ml".to_string(),
            }],
            product: VariantProduct {
                handle: handle.to_string(),
                title: handle.to_string(),
            },
        }
    }

    fn product(n: usize, with_variant: bool) -> Product {
        let handle = format!("balm-{n}");
        let image = Image {
            url: format!("https://cdn.shopify.com/s/files/1/{handle}.jpg"),
            alt_text: None,
            width: Some(1000),
            height: Some(1000),
        };

        Product {
            id: ProductId::parse(format!("gid://shopify/Product/{}", 100 + n)).unwrap(),
            title: format!("Balm {n}"),
            published_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            variants: if with_variant {
                vec![variant(&handle, n, Some(image))]
            } else {
                Vec::new()
            },
            handle,
            vendor: "Tidewater Goods".to_string(),
        }
    }

    fn connection(count: usize, page_info: PageInfo) -> ProductConnection {
        ProductConnection {
            nodes: (0..count).map(|n| product(n, true)).collect(),
            page_info,
        }
    }

    fn middle_page() -> PageInfo {
        PageInfo {
            has_next_page: true,
            has_previous_page: true,
            start_cursor: Some("start".to_string()),
            end_cursor: Some("end".to_string()),
        }
    }

    fn loading(items: &[ProductItemView]) -> Vec<&'static str> {
        items
            .iter()
            .map(|item| item.image.as_ref().unwrap().loading)
            .collect()
    }

    #[test]
    fn test_items_link_to_first_variant() {
        let view = ListingView::new(&connection(4, PageInfo::default()), "/products", None, 0);

        assert_eq!(view.items.len(), 4);
        assert_eq!(view.items[0].href, "/products/balm-0?Size=50ml");
        assert_eq!(view.items[3].title, "Balm 3");
        assert_eq!(view.items[0].price, "$18.00");
        assert!(view.items[0].compare_at_price.is_none());
    }

    #[test]
    fn test_items_keep_locale_prefix() {
        let view = ListingView::new(
            &connection(1, PageInfo::default()),
            "/fr-ca/products",
            None,
            0,
        );
        assert_eq!(view.items[0].href, "/fr-ca/products/balm-0?Size=50ml");
    }

    #[test]
    fn test_image_alt_falls_back_to_title() {
        let mut conn = connection(2, PageInfo::default());
        if let Some(image) = conn.nodes[1].variants[0].image.as_mut() {
            image.alt_text = Some("Tin of balm".to_string());
        }

        let view = ListingView::new(&conn, "/products", None, 0);
        assert_eq!(view.items[0].image.as_ref().unwrap().alt, "Balm 0");
        assert_eq!(view.items[1].image.as_ref().unwrap().alt, "Tin of balm");
    }

    #[test]
    fn test_missing_image_renders_no_img() {
        let mut conn = connection(1, PageInfo::default());
        conn.nodes[0].variants[0].image = None;

        let listing = ListingView::new(&conn, "/products", None, 0);
        assert!(listing.items[0].image.is_none());

        let html = ProductListingFragment { listing, loaded: 1 }.render().unwrap();
        assert!(!html.contains("<img"));
        assert!(html.contains("<h4>Balm 0</h4>"));
    }

    #[test]
    fn test_eager_loading_by_grid_position() {
        let view = ListingView::new(&connection(10, PageInfo::default()), "/products", None, 0);

        let loading = loading(&view.items);
        assert_eq!(loading[..8], ["eager"; 8]);
        assert_eq!(loading[8..], ["lazy"; 2]);
    }

    #[test]
    fn test_eager_loading_continues_from_first_position() {
        let view = ListingView::new(&connection(4, middle_page()), "/products", None, 6);
        assert_eq!(loading(&view.items), ["eager", "eager", "lazy", "lazy"]);
    }

    #[test]
    fn test_zero_variant_products_are_skipped() {
        let mut conn = connection(9, PageInfo::default());
        conn.nodes[0] = product(0, false);

        let view = ListingView::new(&conn, "/products", None, 0);
        assert_eq!(view.items.len(), 8);
        assert_eq!(view.items[0].title, "Balm 1");
        // Positions are counted after skipping.
        assert_eq!(loading(&view.items), ["eager"; 8]);
    }

    #[test]
    fn test_compare_at_price_only_when_higher() {
        let mut conn = connection(2, PageInfo::default());
        conn.nodes[0].variants[0].compare_at_price = Some(Price::parse("24", "USD").unwrap());
        conn.nodes[1].variants[0].compare_at_price = Some(Price::parse("10", "USD").unwrap());

        let view = ListingView::new(&conn, "/products", None, 0);
        assert_eq!(view.items[0].compare_at_price.as_deref(), Some("$24.00"));
        assert!(view.items[1].compare_at_price.is_none());
    }

    #[test]
    fn test_control_links_keep_other_params() {
        let view = ListingView::new(
            &connection(4, middle_page()),
            "/products",
            Some("utm_source=mail&direction=next&cursor=old&loaded=4"),
            4,
        );

        assert_eq!(
            view.previous.href.as_deref(),
            Some("/products?utm_source=mail&direction=previous&cursor=start")
        );
        assert_eq!(
            view.next.href.as_deref(),
            Some("/products?utm_source=mail&direction=next&cursor=end")
        );
    }

    #[test]
    fn test_render_page_has_grid_and_controls() {
        let listing = ListingView::new(&connection(4, middle_page()), "/products", None, 0);
        let html = ProductsIndexTemplate { listing, loaded: 4 }.render().unwrap();

        assert_eq!(html.matches("class=\"product-item\"").count(), 4);
        assert!(html.contains("id=\"products-grid\""));
        assert!(html.contains("Load previous products"));
        assert!(html.contains("Load next products"));
        assert!(!html.contains('↑') && !html.contains('↓'));
        assert_eq!(html.matches("Loading...").count(), 2);
        assert!(!html.contains("aria-disabled"));
        assert!(!html.contains("hx-swap-oob"));
        assert!(html.contains("hx-swap=\"beforeend\""));
        assert!(html.contains("hx-swap=\"afterbegin\""));
        assert!(html.contains("name=\"loaded\" value=\"4\""));
        assert!(html.contains(r#"sizes="(min-width: 45em) 400px, 100vw""#));
    }

    #[test]
    fn test_render_first_page_disables_previous() {
        let page_info = PageInfo {
            has_previous_page: false,
            ..middle_page()
        };
        let listing = ListingView::new(&connection(4, page_info), "/products", None, 0);
        assert!(listing.previous.href.is_none());

        let html = ProductListingFragment { listing, loaded: 4 }.render().unwrap();
        assert_eq!(html.matches(r#"aria-disabled="true""#).count(), 1);
        assert!(!html.contains("<html"));
    }

    #[test]
    fn test_next_page_fragment_appends_after_loaded_items() {
        let uri: Uri = "/products?direction=next&cursor=c&loaded=8".parse().unwrap();
        let fragment = page_fragment(&connection(4, middle_page()), &uri, Direction::Next);

        assert_eq!(fragment.loaded, 12);
        assert_eq!(fragment.control.id, "load-next");
        assert!(fragment.control.oob);
        assert_eq!(loading(&fragment.items), ["lazy"; 4]);

        let html = fragment.render().unwrap();
        assert!(!html.contains("id=\"product-listing\""));
        assert_eq!(html.matches("class=\"product-item\"").count(), 4);
        assert_eq!(html.matches("hx-swap-oob=\"true\"").count(), 2);
        assert!(html.contains("id=\"load-next\""));
        assert!(!html.contains("id=\"load-previous\""));
        assert!(html.contains("value=\"12\""));
    }

    #[test]
    fn test_previous_page_fragment_prepends_at_start() {
        let uri: Uri = "/products?direction=previous&cursor=c&loaded=8".parse().unwrap();
        let fragment = page_fragment(&connection(4, middle_page()), &uri, Direction::Previous);

        assert_eq!(fragment.loaded, 12);
        assert_eq!(fragment.control.id, "load-previous");
        assert_eq!(fragment.control.swap, "afterbegin");
        assert_eq!(loading(&fragment.items), ["eager"; 4]);
    }

    #[test]
    fn test_response_mode_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(ResponseMode::from_headers(&headers), ResponseMode::Page);

        headers.insert("hx-request", "true".parse().unwrap());
        assert_eq!(ResponseMode::from_headers(&headers), ResponseMode::Fragment);

        headers.insert("hx-history-restore-request", "true".parse().unwrap());
        assert_eq!(ResponseMode::from_headers(&headers), ResponseMode::Page);

        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert_eq!(ResponseMode::from_headers(&headers), ResponseMode::Json);
    }

    #[test]
    fn test_json_payload_keeps_storefront_shape() {
        let payload = ProductsPayload {
            products: connection(1, middle_page()),
        };
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["products"]["nodes"][0]["handle"], "balm-0");
        assert_eq!(json["products"]["nodes"][0]["id"], "gid://shopify/Product/100");
        assert_eq!(json["products"]["pageInfo"]["endCursor"], "end");
        assert_eq!(json["products"]["pageInfo"]["hasPreviousPage"], true);
    }
}
