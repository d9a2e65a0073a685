//! Crawl Engine Module
//!
//! The bounded crawl engine: frontier, dedup filter, concurrency throttle, fetch
//! budget, per-page processing and the orchestrator that ties them together.

pub mod budget;
pub mod crawl_types;
pub mod crawler;
pub mod dedup;
pub mod fetcher;
pub mod frontier;
pub mod link_processor;
pub mod orchestrator;
pub mod page_processor;
pub mod page_timeout;
pub mod progress;
pub mod throttle;

pub use budget::{Admission, BudgetGate, FetchSlot};
pub use crawl_types::{
    CrawlError, CrawlPhase, CrawlResult, CrawlStats, CrawlSummary, FetchError, PhaseCell, UrlTask,
};
pub use crawler::VideoCrawler;
pub use dedup::{BloomFilter, DedupFilter, ExpiringSet};
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{ClaimedTask, EnqueueOutcome, Frontier};
pub use link_processor::{LinkReport, extract_links, filter_link, process_page_links};
pub use orchestrator::{ShutdownHandle, crawl_pages};
pub use page_processor::{CrawlContext, PageOutcome, process_single_page};
pub use progress::{NoOpProgress, ProgressReporter};
pub use throttle::{Throttle, ThrottlePermit};
