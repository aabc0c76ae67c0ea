//! Pagination contract for platform listings
//!
//! Listings return one bounded page at a time plus a continuation marker.
//! The GitHub REST API carries that marker in the `Link` response header;
//! the `rel="next"` entry names the next page number and is absent on the
//! last page. Callers loop with [`collect_pages`] until it runs out.

use std::future::Future;

use reqwest::Url;
use serde::Serialize;

/// Largest page size the platform accepts
pub const MAX_PAGE_SIZE: u8 = 100;

/// Page selector sent as `per_page` / `page` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// Items per page
    pub per_page: u8,

    /// Page number (1-based)
    pub page: u32,
}

impl PageRequest {
    /// The first page with the given size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn first(per_page: u8) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
            page: 1,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Next page number, `None` on the last page
    pub next_page: Option<u32>,
}

/// Fetch every page of a listing, in order
///
/// A continuation that does not advance past the current page ends the
/// loop, so a misbehaving upstream cannot spin it forever.
///
/// # Errors
/// Returns the first error produced by `fetch`; items gathered so far are
/// discarded.
pub async fn collect_pages<T, E, F, Fut>(per_page: u8, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut request = PageRequest::first(per_page);

    loop {
        let page = fetch(request).await?;
        items.extend(page.items);

        match page.next_page {
            Some(next) if next > request.page => request.page = next,
            _ => break,
        }
    }

    Ok(items)
}

/// Extract the next page number from a `Link` header value
///
/// ```
/// use corral_client::pagination::next_page_from_link;
///
/// let link = r#"<https://api.github.com/orgs/acme/actions/runner-groups?per_page=100&page=2>; rel="next", <https://api.github.com/orgs/acme/actions/runner-groups?per_page=100&page=4>; rel="last""#;
/// assert_eq!(next_page_from_link(link), Some(2));
/// ```
pub fn next_page_from_link(header: &str) -> Option<u32> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
