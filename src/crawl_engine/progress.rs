//! Per-page crawl hooks, with [`NoOpProgress`] as the silent default

use super::crawl_types::{CrawlSummary, FetchError};

/// Hooks called by the orchestrator and page processor at key points of a run.
///
/// Implementations can forward updates to channels, UIs or test recorders. All
/// hooks are synchronous and called from worker tasks, so keep them cheap.
pub trait ProgressReporter: Send + Sync {
    /// The seed has been queued and workers are starting
    fn report_started(&self, seed_url: &str);

    /// A page was fetched successfully
    fn report_page_fetched(&self, url: &str);

    /// A fetch failed; the task is dropped
    fn report_fetch_failed(&self, url: &str, error: &FetchError);

    /// A page resolved to a video
    fn report_video_discovered(&self, url: &str, video_id: &str);

    /// The orchestrator stopped dispatching new fetches
    fn report_draining(&self, reason: &str);

    /// The run reached `Stopped`
    fn report_completed(&self, summary: &CrawlSummary);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_started(&self, _seed_url: &str) {}

    #[inline(always)]
    fn report_page_fetched(&self, _url: &str) {}

    #[inline(always)]
    fn report_fetch_failed(&self, _url: &str, _error: &FetchError) {}

    #[inline(always)]
    fn report_video_discovered(&self, _url: &str, _video_id: &str) {}

    #[inline(always)]
    fn report_draining(&self, _reason: &str) {}

    #[inline(always)]
    fn report_completed(&self, _summary: &CrawlSummary) {}
}
