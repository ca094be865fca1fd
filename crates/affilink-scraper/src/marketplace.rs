//! Marketplace detection and canonical product URL extraction.
//!
//! Everything here is pure: no I/O, no state beyond the compiled regexes.

use std::sync::LazyLock;

use affilink_core::ParsedAffiliateUrl;
use regex::Regex;

/// Name under which Amazon links are reported and dispatched.
pub const AMAZON: &str = "amazon";

const AMAZON_DOMAIN: &str = "amazon.com";

/// One supported marketplace: how to recognise its links and how to turn
/// them into a direct product URL.
pub struct MarketplaceDescriptor {
    pub name: &'static str,
    /// Host used when building canonical URLs (`https://www.<domain>/...`).
    pub domain: &'static str,
    pub pattern: Regex,
    pub extract_canonical_url: fn(&str) -> Option<String>,
}

impl std::fmt::Debug for MarketplaceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceDescriptor")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Ordered descriptor list. Patterns match distinct domains, so order only
/// breaks ties.
static MARKETPLACES: LazyLock<Vec<MarketplaceDescriptor>> = LazyLock::new(|| {
    vec![MarketplaceDescriptor {
        name: AMAZON,
        domain: AMAZON_DOMAIN,
        pattern: Regex::new(
            r"(?i)(?:^|[/.@])(?:amazon\.(?:com\.au|com\.br|com\.mx|com\.tr|co\.jp|co\.uk|com|ca|de|es|fr|in|it|nl|pl|sa|se|sg|ae)|amzn\.(?:to|com|eu|asia))(?:[:/?#]|$)",
        )
        .expect("valid amazon domain regex"),
        extract_canonical_url: amazon_canonical_from_url,
    }]
});

static DP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/dp/([A-Z0-9]{10})(?:[/?#&]|$)").expect("valid dp regex")
});

static PRODUCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/product/([A-Z0-9]{10})(?:[/?#&]|$)").expect("valid product regex")
});

// Case-sensitive: lowercase 10-letter path words ("electronic") are not ASINs.
static BARE_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([A-Z0-9]{10})(?:/|$)").expect("valid bare segment regex")
});

static ASIN_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[?&]asin=([A-Z0-9]{10})(?:[&#]|$)").expect("valid asin param regex")
});

/// All supported marketplaces, in detection order.
#[must_use]
pub fn marketplaces() -> &'static [MarketplaceDescriptor] {
    &MARKETPLACES
}

/// Returns the first descriptor whose pattern matches `url`.
#[must_use]
pub fn find_marketplace(url: &str) -> Option<&'static MarketplaceDescriptor> {
    marketplaces().iter().find(|m| m.pattern.is_match(url))
}

/// Returns the name of the marketplace `url` points at, if supported.
#[must_use]
pub fn detect_marketplace(url: &str) -> Option<&'static str> {
    find_marketplace(url).map(|m| m.name)
}

/// Builds the direct product URL for `url` using its marketplace's extractor.
///
/// Returns `None` when the marketplace is unknown or no identifier is found;
/// callers then treat the original URL as canonical.
#[must_use]
pub fn extract_canonical_url(url: &str) -> Option<String> {
    let marketplace = find_marketplace(url)?;
    (marketplace.extract_canonical_url)(url)
}

/// Classifies a pasted affiliate link.
#[must_use]
pub fn parse_affiliate_url(url: &str) -> ParsedAffiliateUrl {
    let trimmed = url.trim();
    let marketplace = find_marketplace(trimmed);
    let canonical_url = marketplace
        .and_then(|m| (m.extract_canonical_url)(trimmed))
        .unwrap_or_else(|| trimmed.to_owned());

    ParsedAffiliateUrl {
        affiliate_url: trimmed.to_owned(),
        canonical_url,
        marketplace: marketplace.map(|m| m.name.to_owned()),
    }
}

/// Extracts an Amazon ASIN from `url`.
///
/// Strategies, first hit wins:
/// 1. `/dp/<ASIN>`
/// 2. `/product/<ASIN>` (also covers `/gp/product/`)
/// 3. a bare uppercase 10-character path segment
/// 4. an `ASIN=<ASIN>` query parameter, any case
///
/// The identifier is returned uppercased.
#[must_use]
pub fn extract_asin(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    capture(&DP_RE, url)
        .or_else(|| capture(&PRODUCT_RE, url))
        .or_else(|| capture(&BARE_SEGMENT_RE, path))
        .or_else(|| capture(&ASIN_PARAM_RE, url))
        .map(|asin| asin.to_ascii_uppercase())
}

/// `https://www.amazon.com/dp/<asin>`
#[must_use]
pub fn amazon_canonical_url(asin: &str) -> String {
    canonical_url(AMAZON_DOMAIN, asin)
}

fn canonical_url(domain: &str, identifier: &str) -> String {
    format!("https://www.{domain}/dp/{identifier}")
}

fn amazon_canonical_from_url(url: &str) -> Option<String> {
    extract_asin(url).map(|asin| amazon_canonical_url(&asin))
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
#[path = "marketplace_test.rs"]
mod tests;
