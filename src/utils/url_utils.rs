//! URL shape checks and link normalization.
//!
//! Raw `href` values found on a page are turned into absolute crawl candidates
//! here. Anything that already looks like an absolute http(s) URL passes through
//! untouched; root-relative links are prefixed with the scheme and host of the
//! page they were found on.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Generic "looks like an absolute web URL" pattern
static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("URL_SHAPE: hardcoded regex is valid")
});

/// Check whether `candidate` has the shape of an absolute http(s) URL
#[must_use]
pub fn matches_url_shape(candidate: &str) -> bool {
    URL_SHAPE.is_match(candidate)
}

/// Check if a URL is valid
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

/// Scheme, host and (non-default) port of a page, e.g. `http://example.com:8080`
#[must_use]
pub fn origin_prefix(page: &Url) -> Option<String> {
    let host = page.host_str()?;
    Some(match page.port() {
        Some(port) => format!("{}://{host}:{port}", page.scheme()),
        None => format!("{}://{host}", page.scheme()),
    })
}

/// Rewrite a raw link into an absolute URL relative to the page it was found on.
///
/// Returns `None` for links that can never be crawled: empty values, in-page
/// fragments and non-web schemes such as `mailto:` or `javascript:`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use vidcrawl::utils::normalize_link;
///
/// let page = Url::parse("http://example.com/watch").unwrap();
/// assert_eq!(
///     normalize_link(&page, "/watch?v=abc").as_deref(),
///     Some("http://example.com/watch?v=abc")
/// );
/// ```
#[must_use]
pub fn normalize_link(page: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    if matches_url_shape(raw) {
        return Some(raw.to_string());
    }

    // Scheme-relative (`//cdn.example.com/x`) and bare relative paths need real resolution
    if raw.starts_with("//") {
        return page.join(raw).ok().map(String::from);
    }

    if raw.starts_with('/') {
        return origin_prefix(page).map(|prefix| format!("{prefix}{raw}"));
    }

    // Anything else carrying its own scheme is not a web link
    if Url::parse(raw).is_ok() {
        return None;
    }

    page.join(raw).ok().map(String::from)
}

/// Extract the `v` query parameter that identifies a video on its watch page
#[must_use]
pub fn video_id_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}
