pub mod cache;
pub mod client;
pub mod error;
pub mod marketplace;
pub mod normalize;
pub mod orchestrator;
mod retry;
pub mod types;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache, DEFAULT_TTL};
pub use client::{AmazonProductClient, ClientOptions};
pub use error::ScraperError;
pub use marketplace::{
    detect_marketplace, extract_asin, extract_canonical_url, parse_affiliate_url, AMAZON,
};
pub use normalize::{normalize_product, parse_price};
pub use orchestrator::{ProductSource, ScrapeOrchestrator};
