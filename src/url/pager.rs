//! Page-number rewriting for listing URLs
//!
//! The listing URL is treated as an opaque string: nothing is parsed or
//! validated beyond the `page=` value itself, so any search URL a user pastes
//! in keeps working byte-for-byte apart from the page number.

use crate::{UrlError, UrlResult};

const PAGE_KEY: &str = "page=";

/// Byte span of the page value inside `url`, if a `page=` key is present
fn page_span(url: &str) -> Option<(usize, usize)> {
    let start = url.find(PAGE_KEY)? + PAGE_KEY.len();
    let end = url[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(url.len());
    Some((start, end))
}

fn append_page(url: &str, page: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}{}", url, separator, PAGE_KEY, page)
}

/// Returns `url` pointing at `page`
///
/// An existing `page=` value is replaced in place; otherwise the parameter is
/// appended with `&` or `?` depending on whether the URL already has a query.
///
/// # Example
///
/// ```
/// use blurb_harvest::url::set_page;
///
/// assert_eq!(set_page("https://a.org/works?x=1", 3), "https://a.org/works?x=1&page=3");
/// assert_eq!(set_page("https://a.org/works?page=7&x=1", 3), "https://a.org/works?page=3&x=1");
/// ```
pub fn set_page(url: &str, page: u32) -> String {
    match page_span(url) {
        Some((start, end)) => format!("{}{}{}", &url[..start], page, &url[end..]),
        None => append_page(url, page),
    }
}

/// Advances `url` by one page, returning the new URL and its page number
///
/// A URL without a `page=` key is page 1 by convention, so it advances to 2.
///
/// # Errors
///
/// Returns `UrlError::InvalidPage` when the existing page value is not a number
/// or is already the largest representable page.
pub fn next_page(url: &str) -> UrlResult<(String, u32)> {
    let Some((start, end)) = page_span(url) else {
        return Ok((append_page(url, 2), 2));
    };

    let value = &url[start..end];
    let current: u32 = value.parse().map_err(|_| UrlError::InvalidPage {
        url: url.to_string(),
        value: value.to_string(),
    })?;
    let page = current.checked_add(1).ok_or_else(|| UrlError::InvalidPage {
        url: url.to_string(),
        value: value.to_string(),
    })?;

    Ok((format!("{}{}{}", &url[..start], page, &url[end..]), page))
}

/// Reads the page number from `url`
///
/// Returns `Some(1)` when there is no `page=` key and `None` when the value is
/// not a number.
pub fn current_page(url: &str) -> Option<u32> {
    match page_span(url) {
        Some((start, end)) => url[start..end].parse().ok(),
        None => Some(1),
    }
}
