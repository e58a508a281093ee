//! URL handling module for Blurb-Harvest
//!
//! Pure string transforms over listing URLs: moving between result pages and
//! injecting tag filters. No network access and no validation happen here.

mod pager;
mod tags;

// Re-export main functions
pub use pager::{current_page, next_page, set_page};
pub use tags::{add_tag, TAG_KEY, TAG_SEPARATOR};

/// Builds the first URL of a run
///
/// The optional tag is injected first, then the page is set to `start_page`.
///
/// # Examples
///
/// ```
/// use blurb_harvest::url::starting_url;
///
/// assert_eq!(
///     starting_url("https://a.org/works?q=x", Some("Fluff"), 3),
///     "https://a.org/works?q=x&work_search%5Bother_tag_names%5D=Fluff&page=3"
/// );
/// assert_eq!(starting_url("https://a.org/works", None, 1), "https://a.org/works?page=1");
/// ```
pub fn starting_url(base_url: &str, tag: Option<&str>, start_page: u32) -> String {
    match tag {
        Some(tag) => set_page(&add_tag(base_url, tag), start_page),
        None => set_page(base_url, start_page),
    }
}
