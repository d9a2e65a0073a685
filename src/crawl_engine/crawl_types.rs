//! Core types shared by the crawl engine.
//!
//! Error types, the URL task that flows through the frontier, the crawl phase
//! state machine and the summary returned at the end of a run.

use serde::Serialize;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::CrawlBudget;
use crate::video_events::EventBusError;

/// Errors that stop a crawl run. Per-page failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to set up metadata source: {0}")]
    Metadata(#[from] crate::youtube::MetadataError),

    #[error("Event stream error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Failed to set up fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("Crawl operation was cancelled")]
    Cancelled,

    #[error("Crawl error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::Other(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Transient failure fetching one page. Logged and absorbed, never retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("{url} body exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },
}

/// A page waiting to be crawled.
///
/// `depth` is the remaining hop budget in depth mode and `None` in limit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTask {
    pub url: String,
    pub depth: Option<u32>,
}

impl UrlTask {
    /// The seed task of a crawl with the given budget
    #[must_use]
    pub fn seed(url: impl Into<String>, budget: CrawlBudget) -> Self {
        Self {
            url: url.into(),
            depth: budget.seed_depth(),
        }
    }

    /// A task for a link found on this task's page
    #[must_use]
    pub fn child(&self, url: String) -> Self {
        Self {
            url,
            depth: self.depth.map(|d| d.saturating_sub(1)),
        }
    }

    /// Depth mode only: no hops left, so the task is discarded unfetched
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.depth == Some(0)
    }

    /// Whether children of this task would still be crawlable
    #[must_use]
    pub fn children_crawlable(&self) -> bool {
        self.depth.is_none_or(|d| d > 1)
    }
}

/// Orchestrator lifecycle: `Running -> Draining -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum CrawlPhase {
    /// Workers dequeue and dispatch fetches
    Running = 0,
    /// No new fetches; in-flight work completes
    Draining = 1,
    /// Terminal; downstream collaborators torn down
    Stopped = 2,
}

impl CrawlPhase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Atomic cell holding the current [`CrawlPhase`]. Transitions only move forward.
#[derive(Debug)]
pub struct PhaseCell(AtomicU8);

impl PhaseCell {
    #[must_use]
    pub fn new() -> Self {
        Self(AtomicU8::new(CrawlPhase::Running as u8))
    }

    #[must_use]
    pub fn get(&self) -> CrawlPhase {
        CrawlPhase::from_u8(self.0.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.get() == CrawlPhase::Running
    }

    /// `Running -> Draining`. Returns true only for the caller that made the move.
    pub fn begin_draining(&self) -> bool {
        self.0
            .compare_exchange(
                CrawlPhase::Running as u8,
                CrawlPhase::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn stop(&self) {
        self.0.store(CrawlPhase::Stopped as u8, Ordering::Release);
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters updated by workers over the course of a run
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages_fetched: AtomicUsize,
    pub fetch_failures: AtomicUsize,
    pub videos_discovered: AtomicUsize,
    pub discarded_depth: AtomicUsize,
    pub discarded_duplicates: AtomicUsize,
    pub links_enqueued: AtomicUsize,
}

impl CrawlStats {
    pub(crate) fn bump(counter: &AtomicUsize) -> usize {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn videos_discovered(&self) -> usize {
        self.videos_discovered.load(Ordering::Relaxed)
    }
}

/// Outcome of a finished crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub videos_discovered: usize,
    pub discarded_depth: usize,
    pub discarded_duplicates: usize,
    pub links_enqueued: usize,
    pub frontier_dropped: usize,
    pub peak_in_flight: usize,
    pub duration: Duration,
    pub cancelled: bool,
    pub final_phase: CrawlPhase,
}
