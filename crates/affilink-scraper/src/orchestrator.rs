//! Single entry point that routes product lookups to marketplace clients.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use affilink_core::{AppConfig, ParsedAffiliateUrl, ProductOutcome, ProductRecord, ScrapeFailure};
use futures::future::BoxFuture;

use crate::cache::TtlCache;
use crate::client::{AmazonProductClient, ClientOptions};
use crate::error::ScraperError;
use crate::marketplace::{parse_affiliate_url, AMAZON};

/// A marketplace-specific product data adapter.
pub trait ProductSource: Send + Sync {
    /// Marketplace name this source serves, as reported by detection.
    fn marketplace(&self) -> &'static str;

    /// Looks up product data for `url`. Must report every failure through
    /// the returned outcome.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProductOutcome>;
}

impl ProductSource for AmazonProductClient {
    fn marketplace(&self) -> &'static str {
        AMAZON
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProductOutcome> {
        Box::pin(self.fetch_product(url))
    }
}

/// Dispatches `(url, marketplace)` pairs to the registered [`ProductSource`]s.
pub struct ScrapeOrchestrator {
    sources: Vec<Arc<dyn ProductSource>>,
}

impl ScrapeOrchestrator {
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn ProductSource>>) -> Self {
        Self { sources }
    }

    /// Builds the production orchestrator: one shared product cache and the
    /// Amazon client.
    ///
    /// # Errors
    ///
    /// Propagates [`AmazonProductClient::new`] construction errors.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let mut cache = TtlCache::<ProductRecord>::new(Duration::from_secs(config.cache_ttl_secs));
        if let Some(max_entries) = config.cache_max_entries.and_then(NonZeroUsize::new) {
            cache = cache.with_max_entries(max_entries);
        }

        let amazon: Arc<dyn ProductSource> = Arc::new(AmazonProductClient::new(
            ClientOptions::from_app_config(config),
            Arc::new(cache),
        )?);
        Ok(Self::new(vec![amazon]))
    }

    /// Returns `true` if a source is registered for exactly `name`.
    #[must_use]
    pub fn is_supported_marketplace(&self, name: &str) -> bool {
        self.source_for(name).is_some()
    }

    /// Registered marketplace names, in registration order.
    #[must_use]
    pub fn supported_marketplaces(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.marketplace()).collect()
    }

    /// Fetches product data for `url` from the `marketplace` source.
    ///
    /// An unregistered marketplace yields
    /// [`ScrapeFailure::UnsupportedMarketplace`] without touching any source.
    pub async fn scrape_product(&self, url: &str, marketplace: &str) -> ProductOutcome {
        let Some(source) = self.source_for(marketplace) else {
            tracing::debug!(url, marketplace, "unsupported marketplace");
            return ProductOutcome::Failed(ScrapeFailure::UnsupportedMarketplace);
        };
        source.fetch(url).await
    }

    /// Classifies a pasted affiliate link and fetches its product data.
    pub async fn resolve(&self, affiliate_url: &str) -> (ParsedAffiliateUrl, ProductOutcome) {
        let parsed = parse_affiliate_url(affiliate_url);
        let outcome = match parsed.marketplace.as_deref() {
            Some(marketplace) => self.scrape_product(&parsed.canonical_url, marketplace).await,
            None => ProductOutcome::Failed(ScrapeFailure::UnsupportedMarketplace),
        };
        (parsed, outcome)
    }

    fn source_for(&self, name: &str) -> Option<&Arc<dyn ProductSource>> {
        self.sources.iter().find(|s| s.marketplace() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that counts calls and always returns the same outcome.
    struct CountingSource {
        calls: AtomicUsize,
        outcome: ProductOutcome,
    }

    impl CountingSource {
        fn new(outcome: ProductOutcome) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
            })
        }
    }

    impl ProductSource for CountingSource {
        fn marketplace(&self) -> &'static str {
            AMAZON
        }

        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, ProductOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.outcome.clone();
            Box::pin(async move { outcome })
        }
    }

    fn orchestrator_with(source: &Arc<CountingSource>) -> ScrapeOrchestrator {
        let source: Arc<dyn ProductSource> = Arc::clone(source) as Arc<dyn ProductSource>;
        ScrapeOrchestrator::new(vec![source])
    }

    fn widget() -> ProductRecord {
        ProductRecord {
            title: "Widget".to_owned(),
            description: String::new(),
            price: 24.99,
            sale_price: Some(19.99),
            images: vec!["a.jpg".to_owned()],
            source_url: "https://www.amazon.com/dp/B08N5WRWNW".to_owned(),
        }
    }

    #[test]
    fn amazon_is_the_only_supported_marketplace() {
        let source = CountingSource::new(ProductOutcome::RateLimited);
        let orchestrator = orchestrator_with(&source);
        assert!(orchestrator.is_supported_marketplace("amazon"));
        assert!(!orchestrator.is_supported_marketplace("Amazon"));
        assert!(!orchestrator.is_supported_marketplace("ebay"));
        assert_eq!(orchestrator.supported_marketplaces(), vec!["amazon"]);
    }

    #[tokio::test]
    async fn unknown_marketplace_is_rejected_without_calling_sources() {
        let source = CountingSource::new(ProductOutcome::Ok(widget()));
        let orchestrator = orchestrator_with(&source);

        let outcome = orchestrator
            .scrape_product("https://www.amazon.com/dp/B08N5WRWNW", "unknown")
            .await;

        assert_eq!(
            outcome,
            ProductOutcome::Failed(ScrapeFailure::UnsupportedMarketplace)
        );
        assert_eq!(outcome.error_message().as_deref(), Some("Unsupported marketplace"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn supported_marketplace_dispatches_to_source() {
        let source = CountingSource::new(ProductOutcome::Ok(widget()));
        let orchestrator = orchestrator_with(&source);

        let outcome = orchestrator
            .scrape_product("https://www.amazon.com/dp/B08N5WRWNW", "amazon")
            .await;

        assert_eq!(outcome, ProductOutcome::Ok(widget()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limited_outcome_passes_through() {
        let source = CountingSource::new(ProductOutcome::RateLimited);
        let orchestrator = orchestrator_with(&source);

        let outcome = orchestrator
            .scrape_product("https://www.amazon.com/dp/B08N5WRWNW", "amazon")
            .await;

        assert!(outcome.is_rate_limited());
        assert_eq!(outcome.error_message().as_deref(), Some("429"));
    }

    #[tokio::test]
    async fn resolve_detects_and_canonicalizes_before_dispatch() {
        let source = CountingSource::new(ProductOutcome::Ok(widget()));
        let orchestrator = orchestrator_with(&source);

        let (parsed, outcome) = orchestrator
            .resolve("https://www.amazon.com/Widget/dp/B08N5WRWNW/ref=sr_1_1?tag=shop-20")
            .await;

        assert_eq!(parsed.marketplace.as_deref(), Some("amazon"));
        assert_eq!(parsed.canonical_url, "https://www.amazon.com/dp/B08N5WRWNW");
        assert!(outcome.record().is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_unknown_domain_never_calls_sources() {
        let source = CountingSource::new(ProductOutcome::Ok(widget()));
        let orchestrator = orchestrator_with(&source);

        let (parsed, outcome) = orchestrator.resolve("https://shop.example.com/p/1").await;

        assert_eq!(parsed.marketplace, None);
        assert_eq!(
            outcome,
            ProductOutcome::Failed(ScrapeFailure::UnsupportedMarketplace)
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_orchestrator_supports_nothing() {
        let orchestrator = ScrapeOrchestrator::new(Vec::new());
        assert!(!orchestrator.is_supported_marketplace("amazon"));
    }
}
