//! Detail-page extraction.
//!
//! Every field has its own extractor and is isolated: a failing extractor is
//! logged, recorded as an [`ExtractionEvent`] and replaced by the field's
//! default, while the other fields still run. Extractors also record events
//! for individual entries they had to drop.

mod boarding;
mod dates;
mod inclusions;
mod itinerary;
mod payment;

use chrono::Datelike;
use scraper::{ElementRef, Html};
use tripscan_core::trips::ITINERARY_UNAVAILABLE;
use tripscan_core::{Boilerplate, DetailField, ExtractionEvent, Payment, TripDetail};

use crate::dom::{next_element_sibling, parent_element, text_content};
use crate::error::ExtractError;
use crate::normalize::OvernightDefault;

pub use boarding::extract_boarding_points;
pub use dates::extract_date_offers;
pub use inclusions::{extract_inclusions, MAX_INCLUSIONS};
pub use itinerary::extract_itinerary;
pub use payment::extract_payment;

/// Assumptions the detail extractors need but the page does not state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailContext {
    /// Year given to `"6 de setembro"` dates, which carry none.
    pub reference_year: i32,
    /// Times used for dates that have no time option.
    pub overnight: OvernightDefault,
}

impl Default for DetailContext {
    fn default() -> Self {
        Self {
            reference_year: chrono::Utc::now().year(),
            overnight: OvernightDefault::default(),
        }
    }
}

/// Extracts every detail field from a rendered detail page.
#[must_use]
pub fn extract_detail(html: &str, ctx: &DetailContext) -> TripDetail {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut events = Vec::new();

    let date_offers = isolate(DetailField::DateOffers, &mut events, Vec::new, |ev| {
        extract_date_offers(root, ctx, ev)
    });
    let boarding_points = isolate(DetailField::BoardingPoints, &mut events, Vec::new, |ev| {
        extract_boarding_points(root, ev)
    });
    let itinerary = isolate(
        DetailField::Itinerary,
        &mut events,
        || ITINERARY_UNAVAILABLE.to_string(),
        |_| extract_itinerary(root),
    );
    let inclusions = isolate(DetailField::Inclusions, &mut events, Vec::new, |ev| {
        extract_inclusions(root, ev)
    });
    let payment = isolate(DetailField::Payment, &mut events, Payment::default, |_| {
        extract_payment(root)
    });

    TripDetail {
        date_offers,
        boarding_points,
        itinerary,
        inclusions,
        payment,
        boilerplate: Boilerplate::standard(),
        extraction_events: events,
    }
}

/// Runs one field extractor; on error records the event and returns `fallback()`.
fn isolate<T>(
    field: DetailField,
    events: &mut Vec<ExtractionEvent>,
    fallback: impl FnOnce() -> T,
    run: impl FnOnce(&mut Vec<ExtractionEvent>) -> Result<T, ExtractError>,
) -> T {
    match run(events) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(%field, error = %e, "detail field extraction failed; using default");
            events.push(ExtractionEvent::new(field, e.to_string()));
            fallback()
        }
    }
}

/// Text under a `<summary>` heading.
struct Disclosure {
    body: String,
    /// `true` when the body came from the enclosing `<details>`, `false` when
    /// it came from the summary's next sibling.
    in_details: bool,
}

/// Body of the disclosure headed by `summary`, if the heading mentions
/// `marker` (case-insensitive). The heading's own text is removed.
fn disclosure_body(summary: ElementRef<'_>, marker: &str) -> Option<Disclosure> {
    let heading = text_content(summary);
    if !heading.to_uppercase().contains(marker) {
        return None;
    }
    if let Some(details) = parent_element(summary).filter(|p| p.value().name() == "details") {
        return Some(Disclosure {
            body: text_content(details).replacen(&heading, "", 1),
            in_details: true,
        });
    }
    next_element_sibling(summary).map(|sibling| Disclosure {
        body: text_content(sibling),
        in_details: false,
    })
}

/// Records a dropped or degraded entry and logs it.
fn record(events: &mut Vec<ExtractionEvent>, field: DetailField, reason: String) {
    tracing::warn!(%field, reason = %reason, "partial detail extraction");
    events.push(ExtractionEvent::new(field, reason));
}

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
