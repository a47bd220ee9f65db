//! Command handlers. Each returns the success envelope as JSON; errors are
//! turned into the failure envelope by `main`.
//!
//! Commands that need a page open one browser session, run, and always close
//! it before returning, whether the scrape succeeded or not.

use rust_decimal::Decimal;
use serde_json::Value;
use tripscan_core::{available_months, AppConfig, ListingFilters, ScrapeEnvelope};
use tripscan_scraper::{filter_by_price_range, RenderSession, SessionOptions, TripScraper};

async fn open_scraper(config: &AppConfig) -> anyhow::Result<TripScraper<RenderSession>> {
    let session = RenderSession::open(&SessionOptions::from_app_config(config)).await?;
    Ok(TripScraper::from_app_config(session, config))
}

pub(crate) async fn listing(
    config: &AppConfig,
    month: &str,
    filters: &ListingFilters,
    details: bool,
) -> anyhow::Result<Value> {
    let mut scraper = open_scraper(config).await?;
    let result = scraper.scrape_listing(month, filters, details).await;
    scraper.close().await;

    Ok(serde_json::to_value(ScrapeEnvelope::list(result?))?)
}

pub(crate) async fn detail(config: &AppConfig, url: &str) -> anyhow::Result<Value> {
    let mut scraper = open_scraper(config).await?;
    let outcome = scraper.scrape_detail(url).await;
    scraper.close().await;

    Ok(serde_json::to_value(ScrapeEnvelope::ok(outcome))?)
}

pub(crate) fn months(config: &AppConfig) -> anyhow::Result<Value> {
    let months = available_months(&config.base_url)?;
    Ok(serde_json::to_value(ScrapeEnvelope::list(months))?)
}

pub(crate) async fn price_range(
    config: &AppConfig,
    month: &str,
    filters: &ListingFilters,
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> anyhow::Result<Value> {
    if let (Some(min), Some(max)) = (min, max) {
        anyhow::ensure!(min <= max, "--min ({min}) is greater than --max ({max})");
    }

    let mut scraper = open_scraper(config).await?;
    let result = scraper.scrape_listing(month, filters, false).await;
    scraper.close().await;

    let trips = filter_by_price_range(result?, min, max);
    tracing::info!(kept = trips.len(), "price range applied");
    Ok(serde_json::to_value(ScrapeEnvelope::list(trips))?)
}
