//! Error types for metadata lookups

/// Failures while resolving video metadata for a page
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The API request could not be sent or its body could not be read
    #[error("video API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("video API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The API body was not a valid video list response
    #[error("failed to decode video API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A CSS selector used for scraping failed to parse
    #[error("invalid scrape selector '{0}'")]
    Selector(String),
}
