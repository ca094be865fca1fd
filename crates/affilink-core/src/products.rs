use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of classifying a merchant-supplied affiliate link.
///
/// Built per input and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAffiliateUrl {
    /// The URL as the merchant pasted it, with surrounding whitespace
    /// trimmed.
    pub affiliate_url: String,
    /// Direct product-page URL, or `affiliate_url` itself when no product
    /// identifier could be found.
    pub canonical_url: String,
    /// Detected marketplace name (e.g. `"amazon"`), if any pattern matched.
    pub marketplace: Option<String>,
}

/// Product data used to auto-fill the product form.
///
/// Note the price naming: `price` holds the list (pre-discount) price and
/// `sale_price` the price currently advertised. Storefront templates render
/// `price` struck through when `sale_price` is lower, so the mapping must stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    pub description: String,
    /// Original/list price; falls back to the current price, then `0.0`.
    pub price: f64,
    /// Current price, when the provider reported one.
    pub sale_price: Option<f64>,
    pub images: Vec<String>,
    /// Canonical product URL the record was fetched for.
    pub source_url: String,
}

impl ProductRecord {
    /// Returns `true` when the current price undercuts the list price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.sale_price.is_some_and(|sale| sale > 0.0 && sale < self.price)
    }

    /// First image, used as the product thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Why a lookup produced no product data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeFailure {
    #[error("Unsupported marketplace")]
    UnsupportedMarketplace,

    #[error("Invalid URL — could not extract identifier")]
    InvalidUrl,

    #[error("product API returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("product API error: {0}")]
    Provider(String),

    #[error("could not parse product data: {0}")]
    Parse(String),

    #[error("request to product API failed: {0}")]
    Http(String),
}

/// Terminal outcome of a product lookup.
///
/// Every failure mode is reported as data; callers match on the variant
/// instead of checking an error field.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductOutcome {
    Ok(ProductRecord),
    /// Provider answered HTTP 429. Never cached; the next call retries.
    RateLimited,
    Failed(ScrapeFailure),
}

impl ProductOutcome {
    /// String form of the error for callers that branch on a message,
    /// `"429"` for rate limiting.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            ProductOutcome::Ok(_) => None,
            ProductOutcome::RateLimited => Some("429".to_string()),
            ProductOutcome::Failed(failure) => Some(failure.to_string()),
        }
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProductOutcome::RateLimited)
    }

    #[must_use]
    pub fn record(&self) -> Option<&ProductRecord> {
        match self {
            ProductOutcome::Ok(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_record(self) -> Option<ProductRecord> {
        match self {
            ProductOutcome::Ok(record) => Some(record),
            _ => None,
        }
    }
}

impl From<ScrapeFailure> for ProductOutcome {
    fn from(failure: ScrapeFailure) -> Self {
        ProductOutcome::Failed(failure)
    }
}
