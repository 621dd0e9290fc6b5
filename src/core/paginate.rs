//! Generic page loop used against both backing protocols.
//!
//! The record store paginates by row range and signals end-of-data with an
//! empty page; the contracts API paginates by page number and signals
//! end-of-data with a short page. The two signals are distinct and must not
//! be conflated: a range fetch can return exactly `page_size` rows on its
//! final page, and a count-style API never returns an empty page before the
//! short one.

use std::future::Future;

/// Pagination state: a monotonically advancing offset plus the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub offset: usize,
    pub page_size: usize,
}

impl PageCursor {
    pub fn new(page_size: usize) -> Self {
        Self { offset: 0, page_size }
    }

    /// 1-based page number for page-number protocols.
    pub fn page_number(&self) -> usize {
        self.offset / self.page_size + 1
    }

    /// Inclusive end of the row range for range protocols.
    pub fn range_end(&self) -> usize {
        self.offset + self.page_size - 1
    }

    fn advance(&mut self) {
        self.offset += self.page_size;
    }
}

/// End-of-data signal used by a backing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop when a page comes back with zero records (range protocol).
    EmptyPage,
    /// Stop when a page comes back with fewer records than requested
    /// (count protocol; saves the trailing empty-page round trip).
    ShortPage,
}

/// Exhaustively collect every page of a result set.
///
/// `fetch_page` is called once per round trip with the current cursor; any
/// page error aborts the whole fetch and discards what was accumulated.
/// `max_pages` is an advisory truncation cap, not a correctness filter.
///
/// Records come back exactly once and in the backing store's natural order
/// provided the underlying data does not change between round trips; no
/// snapshot isolation is provided, so concurrent writes during a long run
/// can skip or duplicate records.
pub async fn fetch_all_pages<T, E, F, Fut>(
    page_size: usize,
    max_pages: Option<usize>,
    termination: Termination,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(PageCursor) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut cursor = PageCursor::new(page_size);
    let mut all = Vec::new();

    loop {
        let page = fetch_page(cursor).await?;
        let fetched = page.len();

        if termination == Termination::EmptyPage && fetched == 0 {
            break;
        }

        all.extend(page);

        if termination == Termination::ShortPage && fetched < page_size {
            break;
        }
        if let Some(cap) = max_pages {
            if cursor.page_number() >= cap {
                break;
            }
        }

        cursor.advance();
    }

    Ok(all)
}
