use super::crawl_types::{CrawlResult, CrawlSummary};
use super::fetcher::{Fetcher, HttpFetcher};
use super::orchestrator::{ShutdownHandle, crawl_pages};
use super::progress::{NoOpProgress, ProgressReporter};
use crate::config::CrawlConfig;
use crate::video_events::{EventBusConfig, VideoEventBus};
use crate::youtube::{MetadataBackend, MetadataSource};

/// A configured crawl, ready to run once.
///
/// Subscribe to [`VideoCrawler::event_bus`] and grab a
/// [`VideoCrawler::shutdown_handle`] before calling [`VideoCrawler::run`].
pub struct VideoCrawler<F = HttpFetcher, M = MetadataBackend, P = NoOpProgress> {
    config: CrawlConfig,
    fetcher: F,
    metadata: M,
    progress: P,
    bus: VideoEventBus,
    shutdown: ShutdownHandle,
}

impl VideoCrawler {
    /// Crawler with the HTTP fetcher and the metadata source the config selects
    ///
    /// # Errors
    /// Fails if the HTTP client or the metadata source cannot be built.
    pub fn new(config: CrawlConfig) -> CrawlResult<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        let metadata = MetadataBackend::from_config(&config)?;
        Ok(Self::with_components(config, fetcher, metadata, NoOpProgress))
    }
}

impl<F, M, P> VideoCrawler<F, M, P>
where
    F: Fetcher + 'static,
    M: MetadataSource + 'static,
    P: ProgressReporter + 'static,
{
    /// Crawler with caller-supplied collaborators
    pub fn with_components(config: CrawlConfig, fetcher: F, metadata: M, progress: P) -> Self {
        let bus = VideoEventBus::with_config(EventBusConfig::for_crawl(config.event_bus_capacity()));
        Self {
            config,
            fetcher,
            metadata,
            progress,
            bus,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Swap in a different progress reporter
    pub fn with_progress<Q: ProgressReporter + 'static>(self, progress: Q) -> VideoCrawler<F, M, Q> {
        VideoCrawler {
            config: self.config,
            fetcher: self.fetcher,
            metadata: self.metadata,
            progress,
            bus: self.bus,
            shutdown: self.shutdown,
        }
    }

    /// Let an external signal stop this crawl
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// The bus `VideoDiscovered` events are published on
    #[must_use]
    pub fn event_bus(&self) -> &VideoEventBus {
        &self.bus
    }

    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run the crawl until it stops
    ///
    /// # Errors
    /// See [`crawl_pages`].
    pub async fn run(self) -> CrawlResult<CrawlSummary> {
        crawl_pages(
            self.config,
            self.fetcher,
            self.metadata,
            self.progress,
            self.bus,
            self.shutdown,
        )
        .await
    }
}
