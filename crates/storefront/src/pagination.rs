//! Cursor-based pagination for storefront listings.
//!
//! Listing pages are paged with the Storefront API's opaque cursors. The
//! current position travels in the query string:
//!
//! ```text
//! /products                                  first page
//! /products?direction=next&cursor=<end>      page after <end>
//! /products?direction=previous&cursor=<start> page before <start>
//! ```
//!
//! [`PaginationVariables`] turns those parameters into the `first`/`after` or
//! `last`/`before` arguments of a connection query, and [`PageLinks`] builds
//! the previous/next URLs from a returned [`PageInfo`].

use serde::Serialize;
use url::form_urlencoded;

use crate::shopify::types::PageInfo;

/// Query-string parameter holding the cursor.
pub const CURSOR_PARAM: &str = "cursor";

/// Query-string parameter holding the paging direction.
pub const DIRECTION_PARAM: &str = "direction";

/// Query-string parameter holding the number of items already on screen.
///
/// Sent by the listing's load controls so an appended page knows its grid
/// position. It describes client state, so page links never carry it over.
pub const LOADED_PARAM: &str = "loaded";

/// Paging direction relative to the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Items after the cursor.
    #[default]
    Next,
    /// Items before the cursor.
    Previous,
}

impl Direction {
    /// Parse a `direction` parameter. Anything but `previous` pages forward.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("previous") => Self::Previous,
            _ => Self::Next,
        }
    }

    /// Query-string value for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Previous => "previous",
        }
    }
}

/// Pagination parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationQuery {
    pub cursor: Option<String>,
    pub direction: Direction,
}

impl PaginationQuery {
    /// Parse pagination parameters from a raw query string (without `?`).
    ///
    /// The first occurrence of each parameter wins. Empty cursors are
    /// treated as absent. Parsing never fails.
    #[must_use]
    pub fn from_raw(raw_query: Option<&str>) -> Self {
        let mut cursor = None;
        let mut direction = None;

        for (key, value) in form_urlencoded::parse(raw_query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                CURSOR_PARAM if cursor.is_none() => cursor = Some(value.into_owned()),
                DIRECTION_PARAM if direction.is_none() => direction = Some(value.into_owned()),
                _ => {}
            }
        }

        Self {
            cursor: cursor.filter(|c| !c.is_empty()),
            direction: Direction::from_param(direction.as_deref()),
        }
    }

    /// Number of items already rendered, from the `loaded` parameter.
    ///
    /// Missing or malformed values count as zero.
    #[must_use]
    pub fn loaded(raw_query: Option<&str>) -> usize {
        form_urlencoded::parse(raw_query.unwrap_or_default().as_bytes())
            .find(|(key, _)| key == LOADED_PARAM)
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(0)
    }

    /// Parse pagination parameters from a link href such as `/products?cursor=..`.
    #[must_use]
    pub fn from_href(href: &str) -> Self {
        Self::from_raw(href.split_once('?').map(|(_, query)| query))
    }
}

/// Connection arguments for one page of a paginated query.
///
/// Exactly one of `first`/`last` is set. Used as the query variables and as
/// the response cache key, so identical requests share a cached page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationVariables {
    pub first: Option<i64>,
    pub last: Option<i64>,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl PaginationVariables {
    /// `page_by` items after `cursor` (or from the start).
    #[must_use]
    pub const fn forward(page_by: i64, cursor: Option<String>) -> Self {
        Self {
            first: Some(page_by),
            last: None,
            start_cursor: None,
            end_cursor: cursor,
        }
    }

    /// `page_by` items before `cursor` (or from the end).
    #[must_use]
    pub const fn backward(page_by: i64, cursor: Option<String>) -> Self {
        Self {
            first: None,
            last: Some(page_by),
            start_cursor: cursor,
            end_cursor: None,
        }
    }

    /// Build the variables for a parsed query string.
    #[must_use]
    pub fn from_query(query: &PaginationQuery, page_by: i64) -> Self {
        match query.direction {
            Direction::Next => Self::forward(page_by, query.cursor.clone()),
            Direction::Previous => Self::backward(page_by, query.cursor.clone()),
        }
    }

    /// Direction these variables page in.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.last.is_some() {
            Direction::Previous
        } else {
            Direction::Next
        }
    }
}

/// Previous/next page URLs for a listing.
///
/// A link is `None` when the API reports no page in that direction, or
/// reports one without the cursor needed to reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    /// Build links relative to the current request.
    ///
    /// Query parameters other than the pagination ones are kept, so filters
    /// or tracking parameters survive paging.
    #[must_use]
    pub fn new(path: &str, raw_query: Option<&str>, page_info: &PageInfo) -> Self {
        let previous = page_info
            .start_cursor
            .as_deref()
            .filter(|_| page_info.has_previous_page)
            .map(|cursor| page_href(path, raw_query, Direction::Previous, cursor));

        let next = page_info
            .end_cursor
            .as_deref()
            .filter(|_| page_info.has_next_page)
            .map(|cursor| page_href(path, raw_query, Direction::Next, cursor));

        Self { previous, next }
    }
}

/// Build `path?<kept params>&direction=<d>&cursor=<c>`.
fn page_href(path: &str, raw_query: Option<&str>, direction: Direction, cursor: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for (key, value) in form_urlencoded::parse(raw_query.unwrap_or_default().as_bytes()) {
        if !matches!(key.as_ref(), CURSOR_PARAM | DIRECTION_PARAM | LOADED_PARAM) {
            serializer.append_pair(&key, &value);
        }
    }

    serializer
        .append_pair(DIRECTION_PARAM, direction.as_str())
        .append_pair(CURSOR_PARAM, cursor);

    format!("{path}?{}", serializer.finish())
}
