//! Command handlers for `detect`, `resolve` and `scrape`.
//!
//! Each handler prints one JSON document to stdout and maps the lookup
//! outcome to a process exit code.

use std::process::ExitCode;

use affilink_core::{AppConfig, ParsedAffiliateUrl, ProductOutcome};
use affilink_scraper::{detect_marketplace, parse_affiliate_url, ScrapeOrchestrator};
use serde_json::{json, Value};

pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Exit status for a successful lookup.
const EXIT_OK: u8 = 0;
/// Exit status for any failure other than rate limiting.
const EXIT_FAILED: u8 = 1;
/// Exit status when the provider rate-limited the request.
const EXIT_RATE_LIMITED: u8 = 2;

pub(crate) fn run_detect(url: &str) -> anyhow::Result<ExitCode> {
    let parsed = parse_affiliate_url(url);
    print_json(&serde_json::to_value(&parsed)?)?;
    Ok(if parsed.marketplace.is_some() {
        ExitCode::from(EXIT_OK)
    } else {
        ExitCode::from(EXIT_FAILED)
    })
}

pub(crate) async fn run_resolve(config: &AppConfig, url: &str) -> anyhow::Result<ExitCode> {
    let orchestrator = ScrapeOrchestrator::from_app_config(config)?;
    let (parsed, outcome) = orchestrator.resolve(url).await;

    print_json(&resolve_report(&parsed, &outcome)?)?;
    report_failure(&outcome);
    Ok(ExitCode::from(exit_status(&outcome)))
}

pub(crate) async fn run_scrape(
    config: &AppConfig,
    url: &str,
    marketplace: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let orchestrator = ScrapeOrchestrator::from_app_config(config)?;
    let marketplace = marketplace
        .or_else(|| detect_marketplace(url))
        .unwrap_or_default();
    tracing::debug!(url, marketplace, "scraping product");

    let outcome = orchestrator.scrape_product(url, marketplace).await;
    print_json(&outcome_report(&outcome)?)?;
    report_failure(&outcome);
    Ok(ExitCode::from(exit_status(&outcome)))
}

pub(crate) fn exit_status(outcome: &ProductOutcome) -> u8 {
    match outcome {
        ProductOutcome::Ok(_) => EXIT_OK,
        ProductOutcome::RateLimited => EXIT_RATE_LIMITED,
        ProductOutcome::Failed(_) => EXIT_FAILED,
    }
}

/// `{"product": <record|null>, "error": <message|null>}`
pub(crate) fn outcome_report(outcome: &ProductOutcome) -> serde_json::Result<Value> {
    Ok(json!({
        "product": serde_json::to_value(outcome.record())?,
        "error": outcome.error_message(),
    }))
}

/// The parsed link fields merged with [`outcome_report`].
pub(crate) fn resolve_report(
    parsed: &ParsedAffiliateUrl,
    outcome: &ProductOutcome,
) -> serde_json::Result<Value> {
    let mut report = serde_json::to_value(parsed)?;
    if let (Value::Object(fields), Value::Object(extra)) = (&mut report, outcome_report(outcome)?)
    {
        fields.extend(extra);
    }
    Ok(report)
}

fn report_failure(outcome: &ProductOutcome) {
    match outcome {
        ProductOutcome::Ok(_) => {}
        ProductOutcome::RateLimited => eprintln!("rate limited, try later"),
        ProductOutcome::Failed(failure) => eprintln!("error: {failure}"),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
