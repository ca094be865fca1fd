#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Key sent as `X-RapidAPI-Key` to the product-data provider.
    pub product_api_key: String,
    /// Value sent as `X-RapidAPI-Host`.
    pub product_api_host: String,
    pub product_api_base_url: String,
    /// Marketplace country code passed to the provider (e.g. `"US"`).
    pub product_country: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub cache_ttl_secs: u64,
    /// `None` leaves the product cache unbounded.
    pub cache_max_entries: Option<usize>,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("product_api_key", &"[redacted]")
            .field("product_api_host", &self.product_api_host)
            .field("product_api_base_url", &self.product_api_base_url)
            .field("product_country", &self.product_country)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}
