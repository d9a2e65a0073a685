//! YouTube Data API v3 client
//!
//! Resolves the `v` parameter of a watch URL through `GET /videos` instead of
//! scraping the page.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::errors::MetadataError;
use super::types::{VideoData, VideoListResponse};
use crate::utils::{CRAWLER_USER_AGENT, YOUTUBE_API_ENDPOINT, video_id_from_url};

/// Thin client over the `videos` resource
#[derive(Debug, Clone)]
pub struct VideoApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl VideoApiClient {
    /// Client against the public Data API endpoint
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, MetadataError> {
        Self::with_endpoint(api_key, YOUTUBE_API_ENDPOINT, timeout)
    }

    /// Client against an arbitrary endpoint (mock servers, proxies)
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .user_agent(CRAWLER_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch snippet and statistics for one video id
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx responses and undecodable bodies.
    pub async fn list(&self, id: &str) -> Result<VideoListResponse, MetadataError> {
        let response = self
            .client
            .get(format!("{}/videos", self.endpoint))
            .query(&[
                ("part", "snippet,statistics"),
                ("id", id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MetadataError::Status {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Look up the video behind a watch URL; `None` when the URL has no id or the
    /// API knows no such video.
    ///
    /// # Errors
    /// See [`VideoApiClient::list`].
    pub async fn lookup_url(&self, url: &Url) -> Result<Option<VideoData>, MetadataError> {
        let Some(id) = video_id_from_url(url) else {
            return Ok(None);
        };

        let response = self.list(&id).await?;
        Ok(response.items.into_iter().find(VideoData::has_id))
    }
}
