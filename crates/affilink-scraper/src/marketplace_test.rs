use super::*;

const CANONICAL: &str = "https://www.amazon.com/dp/B08N5WRWNW";

// -----------------------------------------------------------------------
// detect_marketplace
// -----------------------------------------------------------------------

#[test]
fn detects_amazon_product_url() {
    assert_eq!(
        detect_marketplace("https://www.amazon.com/dp/B08N5WRWNW"),
        Some(AMAZON)
    );
}

#[test]
fn detects_amazon_regional_domains() {
    assert_eq!(
        detect_marketplace("https://www.amazon.co.uk/dp/B08N5WRWNW"),
        Some(AMAZON)
    );
    assert_eq!(
        detect_marketplace("https://amazon.de/gp/product/B08N5WRWNW"),
        Some(AMAZON)
    );
}

#[test]
fn detects_amazon_short_links() {
    assert_eq!(detect_marketplace("https://amzn.to/3kL9xYz"), Some(AMAZON));
}

#[test]
fn detection_ignores_case() {
    assert_eq!(
        detect_marketplace("HTTPS://WWW.AMAZON.COM/DP/B08N5WRWNW"),
        Some(AMAZON)
    );
}

#[test]
fn unrelated_domain_is_not_detected() {
    assert_eq!(detect_marketplace("https://www.ebay.com/itm/1234567890"), None);
}

#[test]
fn lookalike_domain_is_not_detected() {
    assert_eq!(detect_marketplace("https://notamazon.com/dp/B08N5WRWNW"), None);
    assert_eq!(
        detect_marketplace("https://amazon.com.evil.example/dp/B08N5WRWNW"),
        None
    );
}

#[test]
fn empty_input_is_not_detected() {
    assert_eq!(detect_marketplace(""), None);
}

// -----------------------------------------------------------------------
// extract_canonical_url
// -----------------------------------------------------------------------

#[test]
fn canonical_from_dp_path_with_trailing_ref() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/dp/B08N5WRWNW/ref=abc").as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn canonical_from_product_path() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/product/B08N5WRWNW").as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn canonical_from_gp_product_path() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/gp/product/B08N5WRWNW?tag=shop-20")
            .as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn canonical_from_bare_segment() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/B08N5WRWNW").as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn canonical_from_asin_query_param() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/x?ASIN=B08N5WRWNW").as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn canonical_from_lowercase_asin_query_param() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/x?tag=a&asin=b08n5wrwnw").as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn canonical_strips_tracking_from_slug_url() {
    assert_eq!(
        extract_canonical_url(
            "https://www.amazon.com/Echo-Dot-4th-Gen/dp/B08N5WRWNW?tag=store-20&linkCode=ll1"
        )
        .as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn canonical_uses_dot_com_for_regional_links() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.co.uk/dp/B08N5WRWNW").as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn no_identifier_yields_none() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/gp/help/customer"),
        None
    );
    assert_eq!(extract_canonical_url("https://www.amazon.com/s?k=widgets"), None);
}

#[test]
fn lowercase_path_word_is_not_an_identifier() {
    assert_eq!(
        extract_canonical_url("https://www.amazon.com/electronic/b?node=172282"),
        None
    );
}

#[test]
fn unsupported_marketplace_yields_none() {
    assert_eq!(
        extract_canonical_url("https://www.ebay.com/dp/B08N5WRWNW"),
        None
    );
}

// -----------------------------------------------------------------------
// extract_asin
// -----------------------------------------------------------------------

#[test]
fn dp_strategy_wins_over_query_param() {
    assert_eq!(
        extract_asin("https://www.amazon.com/dp/B08N5WRWNW?ASIN=B000000000").as_deref(),
        Some("B08N5WRWNW")
    );
}

#[test]
fn identifier_must_be_exactly_ten_characters() {
    assert_eq!(extract_asin("https://www.amazon.com/dp/B08N5WRWN"), None);
    assert_eq!(extract_asin("https://www.amazon.com/dp/B08N5WRWNWX"), None);
}

#[test]
fn identifier_is_uppercased() {
    assert_eq!(
        extract_asin("https://www.amazon.com/dp/b08n5wrwnw").as_deref(),
        Some("B08N5WRWNW")
    );
}

// -----------------------------------------------------------------------
// parse_affiliate_url
// -----------------------------------------------------------------------

#[test]
fn parse_affiliate_url_resolves_marketplace_and_canonical() {
    let parsed = parse_affiliate_url("https://www.amazon.com/dp/B08N5WRWNW/ref=abc?tag=x-20");
    assert_eq!(parsed.marketplace.as_deref(), Some(AMAZON));
    assert_eq!(parsed.canonical_url, CANONICAL);
    assert_eq!(
        parsed.affiliate_url,
        "https://www.amazon.com/dp/B08N5WRWNW/ref=abc?tag=x-20"
    );
}

#[test]
fn parse_affiliate_url_falls_back_to_original_for_short_links() {
    let parsed = parse_affiliate_url("https://amzn.to/3kL9xYz");
    assert_eq!(parsed.marketplace.as_deref(), Some(AMAZON));
    assert_eq!(parsed.canonical_url, "https://amzn.to/3kL9xYz");
}

#[test]
fn parse_affiliate_url_for_unknown_marketplace() {
    let parsed = parse_affiliate_url("https://shop.example.com/item/42");
    assert_eq!(parsed.marketplace, None);
    assert_eq!(parsed.canonical_url, "https://shop.example.com/item/42");
}

#[test]
fn parse_affiliate_url_trims_whitespace() {
    let parsed = parse_affiliate_url("  https://www.amazon.com/B08N5WRWNW \n");
    assert_eq!(parsed.affiliate_url, "https://www.amazon.com/B08N5WRWNW");
    assert_eq!(parsed.canonical_url, CANONICAL);
}

#[test]
fn marketplaces_are_listed_in_detection_order() {
    let names: Vec<_> = marketplaces().iter().map(|m| m.name).collect();
    assert_eq!(names, vec![AMAZON]);
}
