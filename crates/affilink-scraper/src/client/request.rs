//! Provider HTTP request and response decoding.

use affilink_core::ProductRecord;
use reqwest::Url;

use super::{ClientInner, PROVIDER};
use crate::error::ScraperError;
use crate::marketplace::amazon_canonical_url;
use crate::normalize::normalize_product;
use crate::retry::retry_with_backoff;
use crate::types::VendorProduct;

impl ClientInner {
    /// Calls the product-details endpoint for `asin` and normalizes the body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] on HTTP 429 (never retried).
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status
    ///   (5xx retried first).
    /// - [`ScraperError::Http`] on network failure after retries.
    /// - [`ScraperError::ApiError`] when the provider reports an error in a
    ///   200 body.
    /// - [`ScraperError::Deserialize`] when the body is not the expected JSON.
    pub(super) async fn request_product(&self, asin: &str) -> Result<ProductRecord, ScraperError> {
        let url = self.product_url(asin);

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .http
                    .get(url.clone())
                    .header("X-RapidAPI-Key", &self.api_key)
                    .header("X-RapidAPI-Host", &self.api_host)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok());
                    return Err(ScraperError::RateLimited {
                        provider: PROVIDER.to_owned(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await?;

        let product = decode_product_details(&body, asin)?;
        Ok(normalize_product(product, &amazon_canonical_url(asin)))
    }

    /// `{base_url}/product-details?asin=<asin>&country=<country>`
    pub(super) fn product_url(&self, asin: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("product-details");
        }
        url.query_pairs_mut()
            .append_pair("asin", asin)
            .append_pair("country", &self.country);
        url
    }
}

/// Decodes a product-details body, unwrapping the `data` envelope when
/// present.
///
/// # Errors
///
/// - [`ScraperError::Deserialize`] if the body is not valid JSON or the
///   product object has the wrong shape.
/// - [`ScraperError::ApiError`] if the envelope reports `"status": "ERROR"`
///   or carries no product.
pub(crate) fn decode_product_details(
    body: &str,
    asin: &str,
) -> Result<VendorProduct, ScraperError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ScraperError::Deserialize {
            context: format!("product details for {asin}"),
            source: e,
        })?;

    if value.get("status").and_then(serde_json::Value::as_str) == Some("ERROR") {
        let message = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ScraperError::ApiError(message));
    }

    let product = match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };

    if product.is_null() {
        return Err(ScraperError::ApiError(format!(
            "no product data returned for {asin}"
        )));
    }

    serde_json::from_value(product).map_err(|e| ScraperError::Deserialize {
        context: format!("product details for {asin}"),
        source: e,
    })
}
