//! Optional per-record enrichment by an outside collaborator, applied through
//! [`crate::TripScraper::scrape_listing_enriched`] or directly with [`enrich_all`].
//!
//! Enrichment never fails the base extraction: an error is kept on the
//! record as `enrichmentError` and the remaining records are still enriched.

use std::collections::BTreeMap;
use std::fmt::Display;

use tripscan_core::TripSummary;

#[allow(async_fn_in_trait)]
pub trait Enricher {
    type Error: Display;

    /// Extra fields for `trip`, keyed by field name.
    async fn enrich(&self, trip: &TripSummary) -> Result<BTreeMap<String, String>, Self::Error>;
}

/// Enriches every record in order and returns how many failed.
pub async fn enrich_all<E: Enricher>(enricher: &E, trips: &mut [TripSummary]) -> usize {
    let mut failed = 0;
    for trip in trips.iter_mut() {
        match enricher.enrich(trip).await {
            Ok(fields) => {
                trip.enrichment = Some(fields);
                trip.enrichment_error = None;
            }
            Err(e) => {
                tracing::warn!(title = %trip.title, error = %e, "enrichment failed");
                trip.enrichment = None;
                trip.enrichment_error = Some(e.to_string());
                failed += 1;
            }
        }
    }
    failed
}
