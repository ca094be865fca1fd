//! Normalization from provider product objects to [`ProductRecord`].

use std::sync::LazyLock;

use affilink_core::ProductRecord;
use regex::Regex;

use crate::types::{RawPrice, VendorProduct};

/// First number in a price string: digits with optional thousands commas
/// and an optional decimal part.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid price regex"));

/// Normalizes a provider product into a [`ProductRecord`] for `source_url`.
///
/// - `description`: bullet points joined by newlines, else the free-text
///   description, else empty.
/// - `price`: the list price when the provider reports one, else the current
///   price, else `0.0`.
/// - `sale_price`: the current price.
/// - `images`: the photo gallery, else the single main photo, else empty.
#[must_use]
pub fn normalize_product(product: VendorProduct, source_url: &str) -> ProductRecord {
    let description = first_list(product.bullet_points, product.about_product)
        .map(|bullets| bullets.join("\n"))
        .or_else(|| first_text(product.description, product.product_description))
        .unwrap_or_default();

    let current_price = product
        .price
        .or(product.product_price)
        .as_ref()
        .map(price_value);
    let list_price = [product.original_price, product.product_original_price]
        .iter()
        .flatten()
        .map(price_value)
        .find(|p| *p > 0.0);
    let price = list_price.or(current_price).unwrap_or(0.0);

    let images = first_list(product.photos, product.product_photos)
        .or_else(|| first_text(product.photo, product.product_photo).map(|photo| vec![photo]))
        .unwrap_or_default();

    ProductRecord {
        title: first_text(product.title, product.product_title).unwrap_or_default(),
        description,
        price,
        sale_price: current_price,
        images,
        source_url: source_url.to_owned(),
    }
}

/// First of two spellings that holds a non-blank string.
fn first_text(short: Option<String>, long: Option<String>) -> Option<String> {
    short
        .filter(|s| !s.trim().is_empty())
        .or_else(|| long.filter(|s| !s.trim().is_empty()))
}

/// First of two spellings that holds a non-empty list.
fn first_list(short: Option<Vec<String>>, long: Option<Vec<String>>) -> Option<Vec<String>> {
    short
        .filter(|v| !v.is_empty())
        .or_else(|| long.filter(|v| !v.is_empty()))
}

/// Extracts the first numeric token from a display price, ignoring currency
/// symbols and thousands separators. Unparsable input yields `0.0`.
#[must_use]
pub fn parse_price(raw: &str) -> f64 {
    PRICE_RE
        .find(raw)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn price_value(raw: &RawPrice) -> f64 {
    match raw {
        RawPrice::Number(n) if n.is_finite() && *n >= 0.0 => *n,
        RawPrice::Number(_) => 0.0,
        RawPrice::Text(s) => parse_price(s),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
