//! Watch-page scraping
//!
//! Pulls snippet and statistics fields straight out of a fetched watch page. The
//! legacy watch layout is tried first, then the `<meta>` tags that current pages
//! still ship for crawlers.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::errors::MetadataError;
use super::types::{Snippet, Statistics, VideoData};
use crate::crawl_engine::fetcher::FetchedPage;
use crate::utils::video_id_from_url;

struct SnippetSelectors {
    published: Selector,
    channel_title: Selector,
    title: Selector,
    description: Selector,
    meta_title: Selector,
    meta_description: Selector,
    meta_published: Selector,
    meta_channel_id: Selector,
    meta_tags: Selector,
}

struct StatisticsSelectors {
    view_count: Selector,
    like_count: Selector,
    dislike_count: Selector,
    comment_count: Selector,
    meta_view_count: Selector,
}

/// Scrapes video metadata from watch-page HTML
pub struct PageScraper {
    snippet: SnippetSelectors,
    statistics: StatisticsSelectors,
}

fn selector(css: &str) -> Result<Selector, MetadataError> {
    Selector::parse(css).map_err(|_| MetadataError::Selector(css.to_string()))
}

impl PageScraper {
    /// Compile every selector once
    ///
    /// # Errors
    /// Returns `MetadataError::Selector` if a built-in selector fails to parse.
    pub fn new() -> Result<Self, MetadataError> {
        Ok(Self {
            snippet: SnippetSelectors {
                published: selector("strong.watch-time-text")?,
                channel_title: selector("div.yt-user-info a")?,
                title: selector("span.watch-title")?,
                description: selector("p#eow-description")?,
                meta_title: selector(r#"meta[name="title"]"#)?,
                meta_description: selector(r#"meta[name="description"]"#)?,
                meta_published: selector(r#"meta[itemprop="datePublished"]"#)?,
                meta_channel_id: selector(r#"meta[itemprop="channelId"]"#)?,
                meta_tags: selector(r#"meta[property="og:video:tag"]"#)?,
            },
            statistics: StatisticsSelectors {
                view_count: selector(".watch-view-count")?,
                like_count: selector(
                    "button.like-button-renderer-like-button span.yt-uix-button-content",
                )?,
                dislike_count: selector(
                    "button.like-button-renderer-dislike-button span.yt-uix-button-content",
                )?,
                comment_count: selector("h2.comment-section-header-renderer b")?,
                meta_view_count: selector(r#"meta[itemprop="interactionCount"]"#)?,
            },
        })
    }

    /// Scrape a watch page into a video record.
    ///
    /// Returns `None` when the URL carries no `v` parameter; such pages are crawled
    /// for links only.
    #[must_use]
    pub fn scrape(&self, url: &Url, page: &FetchedPage) -> Option<VideoData> {
        let id = video_id_from_url(url)?;
        let document = Html::parse_document(&page.body);

        Some(VideoData {
            id,
            snippet: self.scrape_snippet(&document),
            statistics: self.scrape_statistics(&document),
        })
    }

    fn scrape_snippet(&self, document: &Html) -> Snippet {
        let s = &self.snippet;
        Snippet {
            published_at: first_text(document, &s.published)
                .or_else(|| first_content(document, &s.meta_published))
                .unwrap_or_default(),
            channel_id: first_content(document, &s.meta_channel_id).unwrap_or_default(),
            title: first_text(document, &s.title)
                .or_else(|| first_content(document, &s.meta_title))
                .unwrap_or_default(),
            description: first_text(document, &s.description)
                .or_else(|| first_content(document, &s.meta_description))
                .unwrap_or_default(),
            channel_title: first_text(document, &s.channel_title).unwrap_or_default(),
            tags: document
                .select(&s.meta_tags)
                .filter_map(|el| el.value().attr("content"))
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            category_id: String::new(),
        }
    }

    fn scrape_statistics(&self, document: &Html) -> Statistics {
        let s = &self.statistics;
        let count = |sel: &Selector| {
            first_text(document, sel)
                .map(|raw| sanitize_count(&raw))
                .unwrap_or_default()
        };

        let view_count = match count(&s.view_count) {
            views if views.is_empty() => first_content(document, &s.meta_view_count)
                .map(|raw| sanitize_count(&raw))
                .unwrap_or_default(),
            views => views,
        };

        Statistics {
            view_count,
            like_count: collapse_repeated_count(&count(&s.like_count)),
            dislike_count: collapse_repeated_count(&count(&s.dislike_count)),
            favorite_count: String::new(),
            comment_count: count(&s.comment_count),
        }
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el: ElementRef<'_>| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn first_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .find_map(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Reduce a rendered counter such as `"15,309 views"` to its digits (`"15309"`)
#[must_use]
pub fn sanitize_count(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// The like/dislike buttons render their counter twice (`"1,2341,234"`), so a
/// digit string made of two identical halves collapses to one half.
#[must_use]
pub fn collapse_repeated_count(digits: &str) -> String {
    let len = digits.len();
    if len >= 2 && len % 2 == 0 {
        let (head, tail) = digits.split_at(len / 2);
        if head == tail {
            return head.to_string();
        }
    }
    digits.to_string()
}
