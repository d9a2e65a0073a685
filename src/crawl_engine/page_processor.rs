//! Single page processing logic
//!
//! One crawl operation, from a claimed frontier task to its children:
//! - Phase, depth and duplicate checks
//! - Budget admission and throttle permit
//! - Fetch with timeout
//! - Metadata lookup and `VideoDiscovered` publishing
//! - Link discovery and enqueueing

use log::{debug, info, trace, warn};
use std::time::Duration;
use url::Url;

use super::budget::{Admission, BudgetGate};
use super::crawl_types::{CrawlPhase, CrawlStats, CrawlSummary, PhaseCell, UrlTask};
use super::dedup::DedupFilter;
use super::fetcher::{FetchedPage, Fetcher};
use super::frontier::{EnqueueOutcome, Frontier};
use super::link_processor::process_page_links;
use super::page_timeout::with_page_timeout;
use super::progress::ProgressReporter;
use super::throttle::Throttle;
use crate::config::CrawlConfig;
use crate::video_events::{EventBusError, VideoEvent, VideoEventBus};
use crate::youtube::MetadataSource;

/// Shared crawler state handed to every worker
pub struct CrawlContext<F, M, P> {
    pub config: CrawlConfig,
    pub fetcher: F,
    pub metadata: M,
    pub progress: P,
    pub bus: VideoEventBus,
    pub frontier: Frontier,
    pub dedup: DedupFilter,
    pub throttle: Throttle,
    pub budget: BudgetGate,
    pub phase: PhaseCell,
    pub stats: CrawlStats,
}

impl<F, M, P> CrawlContext<F, M, P>
where
    F: Fetcher,
    M: MetadataSource,
    P: ProgressReporter,
{
    /// Build the per-run state from a validated configuration
    pub fn new(config: CrawlConfig, fetcher: F, metadata: M, progress: P, bus: VideoEventBus) -> Self {
        Self {
            frontier: Frontier::new(config.frontier_capacity()),
            dedup: DedupFilter::from_strategy(config.dedup()),
            throttle: Throttle::new(config.concurrency()),
            budget: BudgetGate::new(config.budget()),
            phase: PhaseCell::new(),
            stats: CrawlStats::default(),
            config,
            fetcher,
            metadata,
            progress,
            bus,
        }
    }

    /// `Running -> Draining`: stop dispatching fetches and release idle workers.
    ///
    /// Queued tasks are abandoned; in-flight operations run to completion.
    pub fn begin_draining(&self, reason: &str) {
        if !self.phase.begin_draining() {
            return;
        }

        let abandoned = self.frontier.close();
        self.budget.close();
        info!(
            target: "vidcrawl::frontier",
            "Draining ({reason}): {abandoned} queued URLs abandoned, {} in flight",
            self.throttle.in_flight()
        );
        self.progress.report_draining(reason);
    }

    /// Snapshot of the run counters
    pub fn summary(&self, duration: Duration, cancelled: bool) -> CrawlSummary {
        use std::sync::atomic::Ordering::Relaxed;

        CrawlSummary {
            pages_fetched: self.stats.pages_fetched.load(Relaxed),
            fetch_failures: self.stats.fetch_failures.load(Relaxed),
            videos_discovered: self.stats.videos_discovered.load(Relaxed),
            discarded_depth: self.stats.discarded_depth.load(Relaxed),
            discarded_duplicates: self.stats.discarded_duplicates.load(Relaxed),
            links_enqueued: self.stats.links_enqueued.load(Relaxed),
            frontier_dropped: self.frontier.dropped_total(),
            peak_in_flight: self.throttle.peak_in_flight(),
            duration,
            cancelled,
            final_phase: self.phase.get(),
        }
    }
}

/// How one task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The orchestrator is no longer running
    Skipped,
    /// Depth budget used up before the fetch
    DepthExhausted,
    /// Already crawled
    Duplicate,
    /// Fetch limit reached before the fetch
    BudgetExhausted,
    FetchFailed,
    Crawled { video: bool, links_enqueued: usize },
}

/// Process one claimed task.
///
/// Per-page failures are logged and absorbed; nothing here stops the crawl.
/// Children are enqueued before returning, while the caller still holds the claim.
pub async fn process_single_page<F, M, P>(ctx: &CrawlContext<F, M, P>, task: &UrlTask) -> PageOutcome
where
    F: Fetcher,
    M: MetadataSource,
    P: ProgressReporter,
{
    if !ctx.phase.is_running() {
        return PageOutcome::Skipped;
    }

    if task.is_exhausted() {
        CrawlStats::bump(&ctx.stats.discarded_depth);
        trace!(target: "vidcrawl::frontier", "Depth exhausted, discarding {}", task.url);
        return PageOutcome::DepthExhausted;
    }

    if !ctx.dedup.test_and_set(&task.url) {
        CrawlStats::bump(&ctx.stats.discarded_duplicates);
        trace!(target: "vidcrawl::dedup", "Already seen {}", task.url);
        return PageOutcome::Duplicate;
    }

    let slot = match ctx.budget.admit().await {
        Admission::Unlimited => None,
        Admission::Reserved(slot) => Some(slot),
        Admission::Exhausted => {
            ctx.begin_draining("fetch limit reached");
            return PageOutcome::BudgetExhausted;
        }
    };

    let Ok(_permit) = ctx.throttle.acquire().await else {
        return PageOutcome::Skipped;
    };

    // Draining may have started while this task waited for a permit
    if ctx.phase.get() != CrawlPhase::Running {
        return PageOutcome::Skipped;
    }

    let page = match with_page_timeout(
        ctx.fetcher.fetch(&task.url),
        ctx.config.fetch_timeout(),
        &task.url,
    )
    .await
    {
        Ok(page) => page,
        Err(e) => {
            CrawlStats::bump(&ctx.stats.fetch_failures);
            warn!(target: "vidcrawl::fetch", "Failed to fetch {}: {e}", task.url);
            ctx.progress.report_fetch_failed(&task.url, &e);
            return PageOutcome::FetchFailed;
        }
    };

    let fetched = CrawlStats::bump(&ctx.stats.pages_fetched);
    debug!(target: "vidcrawl::fetch", "Fetched {} ({fetched} pages so far)", task.url);
    ctx.progress.report_page_fetched(&task.url);

    if slot.is_some_and(|slot| slot.commit()) {
        ctx.begin_draining("fetch limit reached");
    }

    let video = discover_video(ctx, task, &page).await;

    let links_enqueued = if task.children_crawlable() {
        enqueue_children(ctx, task, &page)
    } else {
        0
    };

    PageOutcome::Crawled {
        video,
        links_enqueued,
    }
}

/// Look up metadata for a fetched page and publish it if it is a video
async fn discover_video<F, M, P>(ctx: &CrawlContext<F, M, P>, task: &UrlTask, page: &FetchedPage) -> bool
where
    F: Fetcher,
    M: MetadataSource,
    P: ProgressReporter,
{
    let Ok(url) = Url::parse(&task.url) else {
        return false;
    };

    let video = match ctx.metadata.lookup(&url, page).await {
        Ok(Some(video)) if video.has_id() => video,
        Ok(_) => return false,
        Err(e) => {
            warn!(target: "vidcrawl::fetch", "Metadata lookup failed for {}: {e}", task.url);
            return false;
        }
    };

    let video_id = video.id.clone();
    CrawlStats::bump(&ctx.stats.videos_discovered);
    ctx.progress.report_video_discovered(&task.url, &video_id);

    match ctx
        .bus
        .publish_with_backpressure(VideoEvent::video_discovered(task.url.clone(), video))
        .await
    {
        Ok(_) => trace!(target: "vidcrawl::events", "Published video {video_id}"),
        Err(EventBusError::NoSubscribers) => {
            debug!(target: "vidcrawl::events", "No subscribers for video {video_id}");
        }
        Err(e) => warn!(target: "vidcrawl::events", "Failed to publish video {video_id}: {e}"),
    }

    true
}

fn enqueue_children<F, M, P>(ctx: &CrawlContext<F, M, P>, task: &UrlTask, page: &FetchedPage) -> usize
where
    F: Fetcher,
    M: MetadataSource,
    P: ProgressReporter,
{
    let report = process_page_links(&page.url, &page.body, &ctx.config);

    let mut queued = 0;
    for link in report.accepted {
        match ctx.frontier.enqueue(task.child(link)) {
            EnqueueOutcome::Rejected => break,
            EnqueueOutcome::Queued | EnqueueOutcome::QueuedAfterOverflow { .. } => {
                queued += 1;
            }
        }
    }

    if queued > 0 {
        ctx.stats
            .links_enqueued
            .fetch_add(queued, std::sync::atomic::Ordering::Relaxed);
    }
    queued
}
