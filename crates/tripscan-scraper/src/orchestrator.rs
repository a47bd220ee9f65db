//! Per-request composition: build the listing URL, navigate, extract, and
//! optionally visit each detail page in turn.
//!
//! A [`TripScraper`] exclusively owns its page. Every call borrows it
//! mutably, so two scrapes can never interleave on the same page; callers
//! that share one scraper across tasks must serialize access themselves
//! (e.g. behind a `tokio::sync::Mutex`).

use std::time::Duration;

use tripscan_core::{
    listing_url, AppConfig, ExtractionOutcome, ListingFilters, TripDetail, TripSummary,
};

use crate::detail::{extract_detail, DetailContext};
use crate::driver::PageDriver;
use crate::enrich::{enrich_all, Enricher};
use crate::error::ScraperError;
use crate::listing::extract_listing;
use crate::navigation::{navigate_with_retry, NavigationPolicy};

const CURRENT_URL_SCRIPT: &str = "document.location.href";

/// Delays applied around page snapshots and between detail fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeTimings {
    /// Wait after the listing page is ready, before reading its DOM.
    pub listing_settle: Duration,
    /// Wait after a detail page is ready, before reading its DOM.
    pub detail_settle: Duration,
    /// Pause between successive detail fetches.
    pub detail_pacing: Duration,
}

impl Default for ScrapeTimings {
    fn default() -> Self {
        Self {
            listing_settle: Duration::from_millis(1_000),
            detail_settle: Duration::from_millis(500),
            detail_pacing: Duration::from_millis(300),
        }
    }
}

impl ScrapeTimings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            listing_settle: Duration::from_millis(config.listing_settle_ms),
            detail_settle: Duration::from_millis(config.detail_settle_ms),
            detail_pacing: Duration::from_millis(config.detail_pacing_ms),
        }
    }

    /// No delays at all.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            listing_settle: Duration::ZERO,
            detail_settle: Duration::ZERO,
            detail_pacing: Duration::ZERO,
        }
    }
}

pub struct TripScraper<D: PageDriver> {
    driver: D,
    base_url: String,
    policy: NavigationPolicy,
    timings: ScrapeTimings,
    detail_ctx: DetailContext,
}

impl<D: PageDriver> TripScraper<D> {
    /// Scraper with the documented default budgets and delays.
    pub fn new(driver: D, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            policy: NavigationPolicy::default(),
            timings: ScrapeTimings::default(),
            detail_ctx: DetailContext::default(),
        }
    }

    pub fn from_app_config(driver: D, config: &AppConfig) -> Self {
        Self {
            driver,
            base_url: config.base_url.clone(),
            policy: NavigationPolicy::from_app_config(config),
            timings: ScrapeTimings::from_app_config(config),
            detail_ctx: DetailContext::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_timings(mut self, timings: ScrapeTimings) -> Self {
        self.timings = timings;
        self
    }

    #[must_use]
    pub fn with_detail_context(mut self, ctx: DetailContext) -> Self {
        self.detail_ctx = ctx;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scrapes one listing page, optionally merging each package's detail.
    ///
    /// Detail fetches run one at a time with the pacing delay between them.
    /// A detail page that cannot be read leaves a degraded detail on that
    /// record and the loop moves on.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Core`] for an invalid base URL, and any
    /// navigation or content error of the listing page itself.
    pub async fn scrape_listing(
        &mut self,
        month: &str,
        filters: &ListingFilters,
        include_details: bool,
    ) -> Result<Vec<TripSummary>, ScraperError> {
        let url = listing_url(&self.base_url, month, filters)?;
        tracing::info!(url = %url, month, include_details, "scraping listing");

        navigate_with_retry(&mut self.driver, &url, &self.policy).await?;
        settle(self.timings.listing_settle).await;
        let html = self.driver.content().await?;
        let page_url = self.current_url().await.unwrap_or_else(|| url.clone());

        let mut trips = extract_listing(&html, &page_url);
        tracing::info!(url = %url, count = trips.len(), "listing extracted");

        if include_details {
            self.attach_details(&mut trips).await;
        }
        Ok(trips)
    }

    /// [`Self::scrape_listing`] followed by per-record enrichment. An
    /// enrichment failure only marks its own record.
    ///
    /// # Errors
    ///
    /// Same as [`Self::scrape_listing`]; enrichment never adds an error.
    pub async fn scrape_listing_enriched<E: Enricher>(
        &mut self,
        month: &str,
        filters: &ListingFilters,
        include_details: bool,
        enricher: &E,
    ) -> Result<Vec<TripSummary>, ScraperError> {
        let mut trips = self.scrape_listing(month, filters, include_details).await?;
        let failed = enrich_all(enricher, &mut trips).await;
        if failed > 0 {
            tracing::warn!(failed, total = trips.len(), "some records were not enriched");
        }
        Ok(trips)
    }

    /// Scrapes one detail page. Never fails: an unreadable page yields
    /// [`ExtractionOutcome::Degraded`] with the fully defaulted record.
    pub async fn scrape_detail(&mut self, url: &str) -> ExtractionOutcome {
        match self.fetch_detail(url).await {
            Ok(detail) => ExtractionOutcome::Extracted(detail),
            Err(e) => {
                tracing::warn!(url, error = %e, "detail page unreadable; using degraded record");
                ExtractionOutcome::Degraded {
                    reason: e.to_string(),
                    detail: TripDetail::degraded(),
                }
            }
        }
    }

    /// Releases the page. Safe to call more than once.
    pub async fn close(&mut self) {
        self.driver.close().await;
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    async fn fetch_detail(&mut self, url: &str) -> Result<TripDetail, ScraperError> {
        navigate_with_retry(&mut self.driver, url, &self.policy).await?;
        settle(self.timings.detail_settle).await;
        let html = self.driver.content().await?;
        Ok(extract_detail(&html, &self.detail_ctx))
    }

    async fn attach_details(&mut self, trips: &mut [TripSummary]) {
        let total = trips.len();
        let mut fetched = 0_usize;
        let mut degraded = 0_usize;

        for (index, trip) in trips.iter_mut().enumerate() {
            if trip.detail_url.is_empty() {
                tracing::debug!(index, title = %trip.title, "no detail link; skipping");
                continue;
            }
            if fetched > 0 {
                settle(self.timings.detail_pacing).await;
            }
            fetched += 1;

            tracing::debug!(index, total, url = %trip.detail_url, "fetching detail");
            let outcome = self.scrape_detail(&trip.detail_url).await;
            if outcome.is_degraded() {
                degraded += 1;
            }
            trip.merge_detail(outcome.into_detail());
        }

        if degraded > 0 {
            tracing::warn!(degraded, fetched, "some detail pages were degraded");
        }
    }

    /// URL the page actually ended on, which may differ after redirects.
    async fn current_url(&mut self) -> Option<String> {
        match self.driver.evaluate(CURRENT_URL_SCRIPT).await {
            Ok(serde_json::Value::String(href)) if !href.is_empty() => Some(href),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "could not read page URL");
                None
            }
        }
    }
}

async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
