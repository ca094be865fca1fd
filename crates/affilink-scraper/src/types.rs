//! Response types for the product-details endpoint of the RapidAPI
//! "real-time Amazon data" provider.
//!
//! ## Observed shape
//!
//! The provider wraps the product in an envelope:
//! `{"status": "OK", "request_id": "...", "data": { ... }}`. Older plans and
//! some mirrors return the product object bare, with short field names
//! (`title`, `price`, `photos`). Bodies have been seen carrying both
//! spellings at once, so each spelling is its own field and
//! `normalize.rs` picks the first non-empty one.
//!
//! ### Prices
//! Prices arrive as display strings with a currency symbol (`"$19.99"`,
//! `"$1,299.00"`), occasionally as bare JSON numbers, and are `null` when the
//! product has no offer. Parsing to a number happens in `normalize.rs`.
//!
//! ### Errors with HTTP 200
//! A product the provider cannot find comes back as
//! `{"status": "ERROR", "error": {"message": "..."}}` with a 200 status.

use serde::Deserialize;

/// Product object from the provider, with every field optional.
///
/// Short names come first in each pair; the `product_*` spellings are what
/// the enveloped responses use.
#[derive(Debug, Default, Deserialize)]
pub struct VendorProduct {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub product_title: Option<String>,

    /// Current (possibly discounted) price.
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub product_price: Option<RawPrice>,

    /// List price before discount. `null` when the product is not on sale.
    #[serde(default)]
    pub original_price: Option<RawPrice>,
    #[serde(default)]
    pub product_original_price: Option<RawPrice>,

    /// "About this item" bullet points.
    #[serde(default)]
    pub bullet_points: Option<Vec<String>>,
    #[serde(default)]
    pub about_product: Option<Vec<String>>,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_description: Option<String>,

    /// Full photo gallery.
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    #[serde(default)]
    pub product_photos: Option<Vec<String>>,

    /// Main photo only; used when the gallery is missing.
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub product_photo: Option<String>,
}

/// A price as the provider sends it: display text or a plain number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}
