//! Deterministic paging over queryable collections.
//!
//! Handlers never materialize a full result set: `PageRequest::limit` /
//! `PageRequest::offset` are pushed into the SQL (`ORDER BY <primary key>
//! LIMIT .. OFFSET ..`) together with a separate `COUNT(*)`, and the rows
//! are then wrapped in a [`Page`] carrying the metadata echoed in the
//! `X-Pagination` response header.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Name of the response header carrying the paging metadata as JSON.
pub const PAGINATION_HEADER: &str = "X-Pagination";

/// Page-size bounds, loaded once at startup.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    pub fn from_env() -> Self {
        let default_size = env::var("PAGE_SIZE_DEFAULT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let max_size = env::var("PAGE_SIZE_MAX")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(MAX_PAGE_SIZE);
        Self {
            default_size,
            max_size,
        }
    }
}

/// Raw `pageNumber` / `pageSize` query parameters as sent by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    /// Clamps the raw parameters into a usable request: page >= 1 and
    /// size within `[1, limits.max_size]`, defaulting when unspecified.
    ///
    /// A page past the end of the collection is NOT clamped down; it yields
    /// an empty item list with metadata still populated.
    pub fn normalize(&self, limits: PageLimits) -> PageRequest {
        let number = self.page_number.unwrap_or(1).max(1);
        let size = self
            .page_size
            .unwrap_or(limits.default_size)
            .clamp(1, limits.max_size);
        PageRequest { number, size }
    }
}

/// A normalized page request ready to be pushed into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }
}

/// One page of results plus the metadata describing its position.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Wraps fetched rows with their paging metadata.
    ///
    /// Invariant: `total_pages = ceil(total_count / page_size)`, 0 when the
    /// collection is empty.
    pub fn assemble(items: Vec<T>, request: PageRequest, total_count: i64) -> Self {
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + request.size - 1) / request.size
        };
        Self {
            items,
            current_page: request.number,
            page_size: request.size,
            total_count,
            total_pages,
        }
    }

    /// The `X-Pagination` header value for this page.
    pub fn metadata_header(&self) -> String {
        json!({
            "totalCount": self.total_count,
            "pageSize": self.page_size,
            "currentPage": self.current_page,
            "totalPages": self.total_pages,
        })
        .to_string()
    }
}
