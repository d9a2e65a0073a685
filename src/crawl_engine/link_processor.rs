//! Link extraction, normalization and filtering
//!
//! Anchor `href`s are pulled from the raw page with a streaming rewriter, made
//! absolute relative to the page, and kept only if they have the shape of a web
//! URL and match the configured inclusion pattern.

use html_escape::decode_html_entities;
use log::{debug, warn};
use lol_html::{HtmlRewriter, Settings, element};
use std::collections::HashSet;
use url::Url;

use crate::config::CrawlConfig;
use crate::utils::{matches_url_shape, normalize_link};

/// Collect raw `href` values of anchor tags.
///
/// Malformed markup never fails the whole page: whatever was collected before
/// the parser gave up is returned.
#[must_use]
pub fn extract_links(html: &[u8]) -> Vec<String> {
    let mut hrefs = Vec::new();

    let result = {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        hrefs.push(href);
                    }
                    Ok(())
                })],
                ..Settings::default()
            },
            |_: &[u8]| {},
        );

        rewriter.write(html).and_then(|()| rewriter.end())
    };

    if let Err(e) = result {
        warn!(
            target: "vidcrawl::links",
            "HTML parsing stopped early, keeping {} links: {e}",
            hrefs.len()
        );
    }

    hrefs
}

/// Accept or reject one candidate link.
///
/// Returns the absolute URL when it has a web URL shape and matches the
/// inclusion pattern.
#[must_use]
pub fn filter_link(page: &Url, raw: &str, config: &CrawlConfig) -> Option<String> {
    // Attribute values arrive with character references intact
    let decoded = decode_html_entities(raw);
    let absolute = normalize_link(page, &decoded)?;
    (matches_url_shape(&absolute) && config.includes(&absolute)).then_some(absolute)
}

/// Links found on one page
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkReport {
    /// Raw anchors found
    pub found: usize,
    /// Distinct accepted URLs in document order
    pub accepted: Vec<String>,
}

/// Extract, normalize and filter the links of a fetched page
#[must_use]
pub fn process_page_links(page_url: &str, body: &str, config: &CrawlConfig) -> LinkReport {
    let Ok(page) = Url::parse(page_url) else {
        warn!(target: "vidcrawl::links", "Cannot resolve links against '{page_url}'");
        return LinkReport::default();
    };

    let raw_links = extract_links(body.as_bytes());
    let mut seen = HashSet::new();
    let accepted: Vec<String> = raw_links
        .iter()
        .filter_map(|raw| filter_link(&page, raw, config))
        .filter(|url| seen.insert(url.clone()))
        .collect();

    debug!(
        target: "vidcrawl::links",
        "Found {} links on {page_url}, {} after filtering",
        raw_links.len(),
        accepted.len()
    );

    LinkReport {
        found: raw_links.len(),
        accepted,
    }
}
