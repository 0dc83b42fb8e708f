//! Pagination modes and page windows

use crate::connection::PageInfo;
use crate::store::SharedStore;

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: f64 = 10.0;

/// How rows are paged.
///
/// Raw sizes and totals are `f64` because they usually come straight from
/// user input or a response; they are clamped, never rejected.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Pagination {
    /// Every row is visible; no controls.
    #[default]
    None,
    /// The engine slices the sorted rows.
    Client(ClientPagination),
    /// The caller supplies exactly the current page.
    Server(ServerPagination),
}

impl Pagination {
    pub fn client(page_size: f64) -> Self {
        Pagination::Client(ClientPagination::new(page_size))
    }

    pub fn server(page_size: f64) -> Self {
        Pagination::Server(ServerPagination::new(page_size))
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Pagination::Client(_))
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Pagination::Server(_))
    }

    /// Returns `true` if page controls belong on screen (ignoring loading).
    pub fn shows_controls(&self) -> bool {
        match self {
            Pagination::None => false,
            Pagination::Client(_) => true,
            Pagination::Server(server) => server.page_info.is_some(),
        }
    }
}

/// Client-side slicing.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientPagination {
    pub page_size: f64,
    /// Overrides the row count as the total.
    pub total_items: Option<f64>,
}

impl ClientPagination {
    pub fn new(page_size: f64) -> Self {
        Self {
            page_size,
            total_items: None,
        }
    }

    pub fn with_total_items(mut self, total_items: f64) -> Self {
        self.total_items = Some(total_items);
        self
    }
}

impl Default for ClientPagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Server-delegated paging.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerPagination {
    pub page_size: f64,
    pub page_info: Option<PageInfo>,
    /// Needed for the range text.
    pub total_items: Option<f64>,
}

impl ServerPagination {
    pub fn new(page_size: f64) -> Self {
        Self {
            page_size,
            page_info: None,
            total_items: None,
        }
    }

    pub fn with_page_info(mut self, page_info: Option<PageInfo>) -> Self {
        self.page_info = page_info;
        self
    }

    pub fn with_total_items(mut self, total_items: f64) -> Self {
        self.total_items = Some(total_items);
        self
    }
}

impl Default for ServerPagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Non-finite or non-positive sizes become 1; fractions are floored.
pub fn clamp_page_size(raw: f64) -> usize {
    if !raw.is_finite() || raw <= 0.0 {
        return 1;
    }
    (raw.floor() as usize).max(1)
}

/// Non-finite or negative totals become 0; fractions are floored.
pub fn clamp_total(raw: f64) -> usize {
    if !raw.is_finite() || raw < 0.0 {
        return 0;
    }
    raw.floor() as usize
}

/// At least one page, even when there are no rows.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// The `start–end of total` text under a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl PageRange {
    /// Range for a one-based page.
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let start = if total == 0 {
            0
        } else {
            page.saturating_sub(1).saturating_mul(page_size).saturating_add(1)
        };
        Self {
            start,
            end: page.saturating_mul(page_size).min(total),
            total,
        }
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\u{2013}{} of {}", self.start, self.end, self.total)
    }
}

/// Page control state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    /// Effective one-based page.
    pub page: usize,
    pub page_size: usize,
    /// Unknown in server mode without a total.
    pub total_pages: Option<usize>,
    /// Unknown in server mode without a total.
    pub range: Option<PageRange>,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Visible slice of the sorted rows plus controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Absolute index of the first visible row.
    pub start: usize,
    /// Absolute index one past the last visible row.
    pub end: usize,
    pub controls: Option<PageControls>,
}

impl PageWindow {
    /// The visible part of `rows`.
    pub fn slice<'s, R>(&self, rows: &'s [R]) -> &'s [R] {
        let end = self.end.min(rows.len());
        let start = self.start.min(end);
        &rows[start..end]
    }
}

/// Computes the visible window for `row_count` sorted rows.
///
/// # Example
///
/// ```
/// use datatable_lib::table::{Pagination, reconcile};
///
/// let window = reconcile(&Pagination::client(10.0), 5, 50);
/// assert_eq!((window.start, window.end), (40, 50));
///
/// let controls = window.controls.unwrap();
/// assert_eq!(controls.range.unwrap().to_string(), "41\u{2013}50 of 50");
/// assert!(!controls.has_next);
/// ```
pub fn reconcile(pagination: &Pagination, page: usize, row_count: usize) -> PageWindow {
    match pagination {
        Pagination::None => PageWindow {
            start: 0,
            end: row_count,
            controls: None,
        },
        Pagination::Client(client) => {
            let page_size = clamp_page_size(client.page_size);
            let total = client.total_items.map(clamp_total).unwrap_or(row_count);
            let pages = total_pages(total, page_size);
            let page = page.clamp(1, pages);
            let start = (page - 1).saturating_mul(page_size).min(row_count);
            let end = start.saturating_add(page_size).min(row_count);
            PageWindow {
                start,
                end,
                controls: Some(PageControls {
                    page,
                    page_size,
                    total_pages: Some(pages),
                    range: Some(PageRange::new(page, page_size, total)),
                    has_previous: page > 1,
                    has_next: page < pages,
                }),
            }
        }
        Pagination::Server(server) => {
            let page_size = clamp_page_size(server.page_size);
            let total = server.total_items.map(clamp_total);
            let pages = total.map(|t| total_pages(t, page_size));
            let page = match pages {
                Some(pages) => page.clamp(1, pages),
                None => page.max(1),
            };
            let info = server.page_info.as_ref();
            PageWindow {
                start: 0,
                end: row_count,
                controls: Some(PageControls {
                    page,
                    page_size,
                    total_pages: pages,
                    range: total.map(|t| PageRange::new(page, page_size, t)),
                    has_previous: info.is_some_and(|i| i.has_previous_page),
                    has_next: info.is_some_and(|i| i.has_next_page),
                }),
            }
        }
    }
}

/// Owns the current page number.
pub struct PageController {
    store: SharedStore<usize>,
}

impl PageController {
    pub fn new(store: SharedStore<usize>) -> Self {
        Self { store }
    }

    /// The requested page, before clamping.
    pub fn current(&self) -> usize {
        self.store.get()
    }

    pub fn is_controlled(&self) -> bool {
        self.store.is_controlled()
    }

    pub fn set(&self, page: usize) {
        self.store.set(page.max(1));
    }

    /// Back to the first page.
    pub fn reset(&self) {
        log::debug!("Resetting page to 1");
        self.store.set(1);
    }
}

impl std::fmt::Debug for PageController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("page", &self.store.get())
            .field("controlled", &self.store.is_controlled())
            .finish()
    }
}
