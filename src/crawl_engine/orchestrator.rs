//! Main crawl orchestration logic
//!
//! Coordinates one crawl run:
//! - Seeding the frontier and announcing the run on the event bus
//! - A fixed pool of workers pulling from the frontier
//! - Periodic frontier sweeps, dedup purges and stats logging
//! - The `Running -> Draining -> Stopped` lifecycle and teardown

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::crawl_types::{CrawlResult, CrawlSummary, UrlTask};
use super::fetcher::Fetcher;
use super::page_processor::{CrawlContext, process_single_page};
use super::progress::ProgressReporter;
use crate::config::CrawlConfig;
use crate::video_events::{EventBusError, ShutdownReason, VideoEvent, VideoEventBus};
use crate::youtube::MetadataSource;

/// Cooperative stop signal for a running crawl.
///
/// Cloning shares the signal. Requesting a stop moves the crawl to `Draining`:
/// queued URLs are abandoned and in-flight pages finish.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            debug!(target: "vidcrawl::frontier", "Shutdown requested");
        }
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolves once a stop has been requested
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

/// Run a crawl to completion.
///
/// Returns once the frontier is exhausted, the fetch limit is reached or a stop
/// is requested through `shutdown`, and every in-flight page has finished.
/// Per-page failures never fail the run.
///
/// # Errors
/// Fails only if the event bus was already shut down before the run started.
pub async fn crawl_pages<F, M, P>(
    config: CrawlConfig,
    fetcher: F,
    metadata: M,
    progress: P,
    bus: VideoEventBus,
    shutdown: ShutdownHandle,
) -> CrawlResult<CrawlSummary>
where
    F: Fetcher + 'static,
    M: MetadataSource + 'static,
    P: ProgressReporter + 'static,
{
    let start_time = Instant::now();

    if bus.is_shutdown() {
        return Err(EventBusError::Shutdown.into());
    }

    let seed = config.seed_url().to_string();
    let budget = config.budget();
    let workers = config.workers();

    match bus.publish(VideoEvent::crawl_started(seed.clone(), budget)).await {
        Ok(_) | Err(EventBusError::NoSubscribers) => {}
        Err(e) => return Err(e.into()),
    }

    let ctx = Arc::new(CrawlContext::new(config, fetcher, metadata, progress, bus));
    ctx.frontier.enqueue(UrlTask::seed(seed.clone(), budget));
    ctx.progress.report_started(&seed);

    info!(
        "Starting crawl of {seed} with {workers} workers, {} concurrent fetches, budget {budget:?}",
        ctx.throttle.capacity()
    );

    let shutdown_watcher = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        let shutdown = shutdown.clone();
        async move {
            shutdown.wait().await;
            ctx.begin_draining("shutdown requested");
        }
    });
    let maintenance = tokio::spawn(run_maintenance(Arc::clone(&ctx)));

    let handles: Vec<JoinHandle<()>> = (0..workers)
        .map(|worker_id| tokio::spawn(run_worker(Arc::clone(&ctx), worker_id)))
        .collect();

    let mut worker_failure = None;
    for result in futures::future::join_all(handles).await {
        if let Err(e) = result {
            error!("Crawl worker panicked: {e}");
            worker_failure.get_or_insert_with(|| format!("crawl worker failed: {e}"));
        }
    }

    shutdown_watcher.abort();
    maintenance.abort();

    let cancelled = shutdown.is_requested();
    ctx.begin_draining(if cancelled {
        "shutdown requested"
    } else {
        "frontier exhausted"
    });
    ctx.phase.stop();

    let summary = ctx.summary(start_time.elapsed(), cancelled);
    info!(
        "Crawl finished in {:?}: {} pages fetched, {} failed, {} videos, {} URLs dropped on overflow",
        summary.duration,
        summary.pages_fetched,
        summary.fetch_failures,
        summary.videos_discovered,
        summary.frontier_dropped
    );

    let completed = VideoEvent::crawl_completed(
        summary.pages_fetched,
        summary.videos_discovered,
        summary.duration,
    );
    match ctx.bus.publish_with_backpressure(completed).await {
        Ok(_) | Err(EventBusError::NoSubscribers) => {}
        Err(e) => warn!(target: "vidcrawl::events", "Failed to publish CrawlCompleted: {e}"),
    }

    let reason = match worker_failure {
        _ if cancelled => ShutdownReason::Cancelled,
        Some(failure) => ShutdownReason::Error(failure),
        None => ShutdownReason::CrawlCompleted,
    };
    ctx.bus.shutdown_gracefully(reason).await;

    ctx.progress.report_completed(&summary);
    Ok(summary)
}

async fn run_worker<F, M, P>(ctx: Arc<CrawlContext<F, M, P>>, worker_id: usize)
where
    F: Fetcher,
    M: MetadataSource,
    P: ProgressReporter,
{
    while let Some(claim) = ctx.frontier.next().await {
        let outcome = process_single_page(&ctx, claim.task()).await;
        debug!(
            target: "vidcrawl::frontier",
            "Worker {worker_id}: {} -> {outcome:?}",
            claim.url
        );
        drop(claim);
    }
    debug!(target: "vidcrawl::frontier", "Worker {worker_id} exiting");
}

/// Periodic frontier sweep, dedup purge and stats logging. Aborted at teardown.
async fn run_maintenance<F, M, P>(ctx: Arc<CrawlContext<F, M, P>>)
where
    F: Fetcher,
    M: MetadataSource,
    P: ProgressReporter,
{
    let high_water = ctx.config.overflow_high_water_len();
    let purge_every = ctx.dedup.purge_interval();
    let mut last_purge = Instant::now();

    let mut sweep = tokio::time::interval(ctx.config.sweep_interval());
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = tokio::time::interval(ctx.config.stats_interval());
    stats.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Both intervals fire immediately on the first tick
    sweep.tick().await;
    stats.tick().await;

    loop {
        tokio::select! {
            _ = sweep.tick() => {
                let dropped = ctx.frontier.sweep(high_water);
                if dropped > 0 {
                    debug!(target: "vidcrawl::frontier", "Sweep discarded {dropped} URLs");
                }

                if let Some(every) = purge_every
                    && last_purge.elapsed() >= every
                {
                    ctx.dedup.purge_expired();
                    last_purge = Instant::now();
                }
            }
            _ = stats.tick() => log_stats(&ctx, high_water),
        }
    }
}

fn log_stats<F, M, P>(ctx: &CrawlContext<F, M, P>, high_water: usize) {
    info!(
        "Crawl stats: phase={:?} queued={}/{} (sweep at {high_water}) in_progress={} in_flight={} fetched={} videos={} dedup_entries={} | {}",
        ctx.phase.get(),
        ctx.frontier.len(),
        ctx.frontier.capacity(),
        ctx.frontier.in_progress(),
        ctx.throttle.in_flight(),
        ctx.stats.pages_fetched(),
        ctx.stats.videos_discovered(),
        ctx.dedup.len(),
        ctx.bus.metrics_report()
    );
}
