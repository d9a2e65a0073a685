//! Test utilities shared by the vidcrawl integration tests

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vidcrawl::crawl_engine::{CrawlSummary, FetchError, FetchedPage, Fetcher, ProgressReporter};
use vidcrawl::youtube::{MetadataError, MetadataSource, VideoData};

/// What a [`FakeFetcher`] observed
#[derive(Debug, Default)]
pub struct FetchLog {
    fetched: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FetchLog {
    /// URLs in the order their fetches started
    #[allow(dead_code)]
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }

    #[allow(dead_code)]
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetched.lock().iter().filter(|u| *u == url).count()
    }

    #[allow(dead_code)]
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// In-memory site: URL -> HTML body. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Duration,
    log: Arc<FetchLog>,
}

#[allow(dead_code)]
impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    /// A page whose body is just anchors to `links`
    pub fn linking(self, url: &str, links: &[&str]) -> Self {
        let body = links_page(links);
        self.page(url, body)
    }

    /// Fetches of `url` fail with HTTP 500
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn log(&self) -> Arc<FetchLog> {
        Arc::clone(&self.log)
    }
}

impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.log.fetched.lock().push(url.to_string());
        let now = self.log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 500,
            });
        }

        match self.pages.get(url) {
            Some(body) => Ok(FetchedPage {
                url: url.to_string(),
                status: 200,
                body: body.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Metadata source that never finds a video
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVideos;

impl MetadataSource for NoVideos {
    async fn lookup(
        &self,
        _url: &url::Url,
        _page: &FetchedPage,
    ) -> Result<Option<VideoData>, MetadataError> {
        Ok(None)
    }
}

/// Records every progress hook call
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    events: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl ProgressReporter for RecordingProgress {
    fn report_started(&self, seed_url: &str) {
        self.push(format!("started {seed_url}"));
    }

    fn report_page_fetched(&self, url: &str) {
        self.push(format!("fetched {url}"));
    }

    fn report_fetch_failed(&self, url: &str, _error: &FetchError) {
        self.push(format!("failed {url}"));
    }

    fn report_video_discovered(&self, _url: &str, video_id: &str) {
        self.push(format!("video {video_id}"));
    }

    fn report_draining(&self, reason: &str) {
        self.push(format!("draining {reason}"));
    }

    fn report_completed(&self, summary: &CrawlSummary) {
        self.push(format!("completed {}", summary.pages_fetched));
    }
}

/// HTML document whose body holds one anchor per link
#[allow(dead_code)]
pub fn links_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!("<!DOCTYPE html><html><head><title>page</title></head><body>{anchors}</body></html>")
}

/// Minimal watch page the page scraper understands
#[allow(dead_code)]
pub fn watch_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head>
<meta name="title" content="{title}">
<meta name="description" content="about {title}">
<meta itemprop="channelId" content="UC123">
<meta itemprop="interactionCount" content="1,234">
</head><body>{anchors}</body></html>"#
    )
}
