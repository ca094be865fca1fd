use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_PRODUCT_API_HOST: &str = "real-time-amazon-data.p.rapidapi.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let product_api_key = require("RAPIDAPI_KEY")?;

    let env = parse_environment(&or_default("AFFILINK_ENV", "development"))?;
    let log_level = or_default("AFFILINK_LOG_LEVEL", "info");

    let product_api_host = or_default("AFFILINK_PRODUCT_API_HOST", DEFAULT_PRODUCT_API_HOST);
    let product_api_base_url = or_default(
        "AFFILINK_PRODUCT_API_BASE_URL",
        &format!("https://{product_api_host}"),
    );
    let product_country = or_default("AFFILINK_PRODUCT_COUNTRY", "US").to_uppercase();

    let request_timeout_secs = parse_u64("AFFILINK_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AFFILINK_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("AFFILINK_USER_AGENT", "affilink/0.1 (product-lookup)");

    let cache_ttl_secs = parse_u64("AFFILINK_CACHE_TTL_SECS", "86400")?;
    // 0 leaves the cache unbounded.
    let cache_max_entries =
        Some(parse_usize("AFFILINK_CACHE_MAX_ENTRIES", "0")?).filter(|n| *n > 0);

    let max_retries = parse_u32("AFFILINK_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("AFFILINK_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        env,
        log_level,
        product_api_key,
        product_api_host,
        product_api_base_url,
        product_country,
        request_timeout_secs,
        user_agent,
        cache_ttl_secs,
        cache_max_entries,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AFFILINK_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
