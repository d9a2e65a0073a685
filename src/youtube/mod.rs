//! Video metadata collaborators
//!
//! A [`MetadataSource`] turns a fetched page into an optional [`VideoData`] record.
//! Two sources exist: [`PageScraper`] reads the fetched HTML, [`VideoApiClient`]
//! asks the Data API. [`MetadataBackend`] picks one at configuration time.

pub mod api_client;
pub mod errors;
pub mod scraper;
pub mod types;

use std::future::Future;

use url::Url;

use crate::config::{CrawlConfig, MetadataSourceConfig};
use crate::crawl_engine::fetcher::FetchedPage;

pub use api_client::VideoApiClient;
pub use errors::MetadataError;
pub use self::scraper::{PageScraper, sanitize_count};
pub use types::{Snippet, Statistics, VideoData, VideoListResponse};

/// Resolves video metadata for a crawled page.
///
/// `Ok(None)` means "no video at this URL" and is not an error. Implementations must
/// never return a record with an empty id; callers still check.
pub trait MetadataSource: Send + Sync {
    fn lookup(
        &self,
        url: &Url,
        page: &FetchedPage,
    ) -> impl Future<Output = Result<Option<VideoData>, MetadataError>> + Send;
}

impl MetadataSource for PageScraper {
    async fn lookup(
        &self,
        url: &Url,
        page: &FetchedPage,
    ) -> Result<Option<VideoData>, MetadataError> {
        Ok(self.scrape(url, page).filter(VideoData::has_id))
    }
}

impl MetadataSource for VideoApiClient {
    async fn lookup(
        &self,
        url: &Url,
        _page: &FetchedPage,
    ) -> Result<Option<VideoData>, MetadataError> {
        self.lookup_url(url).await
    }
}

/// Metadata source selected by [`MetadataSourceConfig`]
pub enum MetadataBackend {
    Scrape(PageScraper),
    Api(VideoApiClient),
}

impl MetadataBackend {
    /// Build the backend a crawl configuration asks for
    ///
    /// # Errors
    /// Fails if selectors do not compile or the API client cannot be built.
    pub fn from_config(config: &CrawlConfig) -> Result<Self, MetadataError> {
        match config.metadata_source() {
            MetadataSourceConfig::PageScrape => Ok(Self::Scrape(PageScraper::new()?)),
            MetadataSourceConfig::DataApi { api_key, endpoint } => {
                let client = match endpoint {
                    Some(endpoint) => {
                        VideoApiClient::with_endpoint(api_key, endpoint, config.fetch_timeout())?
                    }
                    None => VideoApiClient::new(api_key, config.fetch_timeout())?,
                };
                Ok(Self::Api(client))
            }
        }
    }
}

impl MetadataSource for MetadataBackend {
    async fn lookup(
        &self,
        url: &Url,
        page: &FetchedPage,
    ) -> Result<Option<VideoData>, MetadataError> {
        match self {
            Self::Scrape(scraper) => scraper.lookup(url, page).await,
            Self::Api(client) => client.lookup(url, page).await,
        }
    }
}
