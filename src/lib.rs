pub mod config;
pub mod crawl_engine;
pub mod utils;
pub mod video_events;
pub mod youtube;

pub use config::{CrawlBudget, CrawlConfig, DedupStrategy, MetadataSourceConfig};
pub use crawl_engine::{
    CrawlError, CrawlPhase, CrawlResult, CrawlSummary, FetchError, Fetcher, HttpFetcher,
    NoOpProgress, ProgressReporter, ShutdownHandle, VideoCrawler,
};
pub use video_events::{JsonLinesPublisher, VideoEvent, VideoEventBus};
pub use youtube::{MetadataBackend, MetadataSource, VideoData};

use tokio::io::AsyncWrite;

/// Crawl and stream every discovered video to `writer` as JSON lines.
///
/// Returns the run summary and the number of records written.
///
/// # Errors
/// Fails if the crawler cannot be set up or the writer fails.
pub async fn crawl_to_writer<W>(
    config: CrawlConfig,
    writer: W,
    shutdown: ShutdownHandle,
) -> CrawlResult<(CrawlSummary, usize)>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let crawler = VideoCrawler::new(config)?.with_shutdown(shutdown);

    let publisher = JsonLinesPublisher::new(crawler.event_bus(), writer);
    let publisher_task = tokio::spawn(publisher.run());

    let summary = crawler.run().await?;

    let written = publisher_task
        .await
        .map_err(|e| CrawlError::Other(format!("publisher task failed: {e}")))??;

    Ok((summary, written))
}

/// Crawl with stdout as the video stream
///
/// # Errors
/// See [`crawl_to_writer`].
pub async fn crawl(config: CrawlConfig) -> CrawlResult<CrawlSummary> {
    let (summary, _) = crawl_to_writer(config, tokio::io::stdout(), ShutdownHandle::new()).await?;
    Ok(summary)
}
