//! Tag filter injection
//!
//! The archive ORs together every tag listed in the "other tags" search
//! field, separated by an encoded comma.

use url::form_urlencoded;

/// Query key of the "other tags" search field
pub const TAG_KEY: &str = "work_search%5Bother_tag_names%5D=";

/// Encoded comma between tags in the tag field
pub const TAG_SEPARATOR: &str = "%2C";

/// Adds `tag` to the tag filter of `url`
///
/// The tag is form-urlencoded and placed in front of any tags already present.
/// When the URL has no tag field at all, one is appended holding just `tag`.
///
/// # Example
///
/// ```
/// use blurb_harvest::url::add_tag;
///
/// let url = add_tag("https://a.org/works?work_search%5Bother_tag_names%5D=Angst", "Fluff");
/// assert_eq!(url, "https://a.org/works?work_search%5Bother_tag_names%5D=Fluff%2CAngst");
/// ```
pub fn add_tag(url: &str, tag: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(tag.as_bytes()).collect();

    match url.find(TAG_KEY) {
        Some(index) => {
            let start = index + TAG_KEY.len();
            let rest = &url[start..];
            if rest.is_empty() || rest.starts_with('&') {
                format!("{}{}{}", &url[..start], encoded, rest)
            } else {
                format!("{}{}{}{}", &url[..start], encoded, TAG_SEPARATOR, rest)
            }
        }
        None => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}{}{}", url, separator, TAG_KEY, encoded)
        }
    }
}
