use affilink_core::{ProductOutcome, ScrapeFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {provider} (retry after {retry_after_secs:?}s)")]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("product API error: {0}")]
    ApiError(String),

    #[error("no product identifier in URL \"{url}\"")]
    InvalidProductUrl { url: String },

    #[error("invalid product API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Collapses an internal error into the outcome reported to callers.
///
/// This is the only place an error leaves the engine, and it leaves as data.
impl From<ScraperError> for ProductOutcome {
    fn from(err: ScraperError) -> Self {
        let failure = match err {
            ScraperError::RateLimited { .. } => return ProductOutcome::RateLimited,
            ScraperError::InvalidProductUrl { .. } => ScrapeFailure::InvalidUrl,
            ScraperError::UnexpectedStatus { status, .. } => {
                ScrapeFailure::UnexpectedStatus { status }
            }
            ScraperError::ApiError(message) => ScrapeFailure::Provider(message),
            ScraperError::Deserialize { .. } => ScrapeFailure::Parse(err.to_string()),
            ScraperError::Http(e) => ScrapeFailure::Http(e.to_string()),
            ScraperError::InvalidBaseUrl { .. } => ScrapeFailure::Http(err.to_string()),
        };
        ProductOutcome::Failed(failure)
    }
}
