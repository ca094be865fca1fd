//! Amazon product-data client backed by a RapidAPI provider.

mod request;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use affilink_core::{AppConfig, ProductOutcome, ProductRecord};
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use reqwest::{Client, Url};

use crate::cache::TtlCache;
use crate::error::ScraperError;
use crate::marketplace::extract_asin;

/// Provider name used to scope cache keys.
pub const PROVIDER: &str = "rapidapi";

const DEFAULT_API_HOST: &str = "real-time-amazon-data.p.rapidapi.com";

type InFlight = Shared<BoxFuture<'static, ProductOutcome>>;

/// The table holds weak handles: a request lives only while some caller
/// awaits it, and a dropped request is restarted by the next lookup.
type WeakInFlight = WeakShared<BoxFuture<'static, ProductOutcome>>;

/// Cache key for a product identifier: `"rapidapi-product-<ASIN>"`.
#[must_use]
pub fn cache_key(asin: &str) -> String {
    format!("{PROVIDER}-product-{asin}")
}

/// Connection and retry settings for [`AmazonProductClient`].
#[derive(Clone)]
pub struct ClientOptions {
    pub api_key: String,
    pub api_host: String,
    pub base_url: String,
    /// Marketplace country passed as the `country` query parameter.
    pub country: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after a transient failure. `0` disables retries.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl ClientOptions {
    /// Options for the production provider with default timeouts and retries.
    #[must_use]
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_owned(),
            api_host: DEFAULT_API_HOST.to_owned(),
            base_url: format!("https://{DEFAULT_API_HOST}"),
            country: "US".to_owned(),
            timeout_secs: 30,
            user_agent: "affilink/0.1 (product-lookup)".to_owned(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.product_api_key.clone(),
            api_host: config.product_api_host.clone(),
            base_url: config.product_api_base_url.clone(),
            country: config.product_country.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_key", &"[redacted]")
            .field("api_host", &self.api_host)
            .field("base_url", &self.base_url)
            .field("country", &self.country)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

/// Turns Amazon product URLs into [`ProductRecord`]s.
///
/// Successful lookups are cached under [`cache_key`] for the cache's default
/// TTL. Rate-limit and error outcomes are never cached. Concurrent lookups
/// of the same product share one provider request.
///
/// Cheap to clone; clones share the HTTP client, cache, and in-flight table.
#[derive(Clone)]
pub struct AmazonProductClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    api_key: String,
    api_host: String,
    base_url: Url,
    country: String,
    max_retries: u32,
    backoff_base_ms: u64,
    cache: Arc<TtlCache<ProductRecord>>,
    in_flight: Mutex<HashMap<String, WeakInFlight>>,
}

impl AmazonProductClient {
    /// Creates a client that stores results in `cache`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    /// - [`ScraperError::InvalidBaseUrl`] if `options.base_url` does not parse.
    pub fn new(
        options: ClientOptions,
        cache: Arc<TtlCache<ProductRecord>>,
    ) -> Result<Self, ScraperError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&options.user_agent)
            .build()?;

        // Single trailing slash; `product_url` pops the empty segment.
        let normalised = format!("{}/", options.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: options.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                api_key: options.api_key,
                api_host: options.api_host,
                base_url,
                country: options.country,
                max_retries: options.max_retries,
                backoff_base_ms: options.backoff_base_ms,
                cache,
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Looks up product data for an Amazon product URL.
    ///
    /// Never fails: every error is reported through [`ProductOutcome`].
    pub async fn fetch_product(&self, url: &str) -> ProductOutcome {
        let Some(asin) = extract_asin(url) else {
            tracing::debug!(url, "no ASIN found in product URL");
            return ScraperError::InvalidProductUrl {
                url: url.to_owned(),
            }
            .into();
        };

        let key = cache_key(&asin);
        if let Some(record) = self.inner.cache.get(&key) {
            tracing::debug!(asin = %asin, "product cache hit");
            return ProductOutcome::Ok(record);
        }

        tracing::debug!(asin = %asin, "product cache miss");
        self.join_or_start(asin, key).await
    }

    /// Number of provider requests currently awaited by at least one caller.
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.inner
            .lock_in_flight()
            .values()
            .filter(|request| request.upgrade().is_some())
            .count()
    }

    /// Returns the shared request for `key`, starting one if none is running.
    fn join_or_start(&self, asin: String, key: String) -> InFlight {
        let mut in_flight = self.inner.lock_in_flight();
        if let Some(existing) = in_flight.get(&key).and_then(WeakShared::upgrade) {
            tracing::debug!(asin = %asin, "joining in-flight product request");
            return existing;
        }

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let request = async move {
            let outcome = inner.load_product(&asin, &task_key).await;
            inner.lock_in_flight().remove(&task_key);
            outcome
        }
        .boxed()
        .shared();

        if let Some(weak) = request.downgrade() {
            in_flight.insert(key, weak);
        }
        request
    }
}

impl ClientInner {
    /// Fetches, caches on success, and converts errors to outcomes.
    async fn load_product(&self, asin: &str, key: &str) -> ProductOutcome {
        // A request that finished between our cache miss and taking the
        // in-flight lock has already filled the cache.
        if let Some(record) = self.cache.get(key) {
            return ProductOutcome::Ok(record);
        }

        match self.request_product(asin).await {
            Ok(record) => {
                tracing::info!(asin, title = %record.title, "fetched product details");
                self.cache.set(key, record.clone());
                ProductOutcome::Ok(record)
            }
            Err(err @ ScraperError::RateLimited { .. }) => {
                tracing::warn!(asin, error = %err, "product API rate limited, not caching");
                err.into()
            }
            Err(err) => {
                tracing::warn!(asin, error = %err, "product lookup failed");
                err.into()
            }
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, WeakInFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
