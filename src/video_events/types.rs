//! Events emitted over the course of a crawl

use serde::{Deserialize, Serialize};

use crate::config::CrawlBudget;
use crate::youtube::VideoData;

/// Why the event stream was closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutdownReason {
    /// The frontier was exhausted or the budget spent
    CrawlCompleted,
    /// The crawl stopped on an error
    Error(String),
    /// An operator asked the crawl to stop
    Cancelled,
}

/// Event types emitted during a crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VideoEvent {
    /// The seed URL has been admitted and workers are starting
    CrawlStarted {
        seed_url: String,
        budget: CrawlBudget,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// A fetched page resolved to a video
    VideoDiscovered {
        url: String,
        video: VideoData,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// The crawl reached `Stopped`
    CrawlCompleted {
        pages_fetched: usize,
        videos_discovered: usize,
        duration: std::time::Duration,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// The bus is closing; subscribers should exit their loops
    Shutdown {
        reason: ShutdownReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl VideoEvent {
    #[must_use]
    pub fn crawl_started(seed_url: String, budget: CrawlBudget) -> Self {
        Self::CrawlStarted {
            seed_url,
            budget,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn video_discovered(url: String, video: VideoData) -> Self {
        Self::VideoDiscovered {
            url,
            video,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn crawl_completed(
        pages_fetched: usize,
        videos_discovered: usize,
        duration: std::time::Duration,
    ) -> Self {
        Self::CrawlCompleted {
            pages_fetched,
            videos_discovered,
            duration,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn shutdown(reason: ShutdownReason) -> Self {
        Self::Shutdown {
            reason,
            timestamp: chrono::Utc::now(),
        }
    }

    /// The discovered video, if this is a `VideoDiscovered` event
    #[must_use]
    pub fn video(&self) -> Option<&VideoData> {
        match self {
            Self::VideoDiscovered { video, .. } => Some(video),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown { .. })
    }
}
