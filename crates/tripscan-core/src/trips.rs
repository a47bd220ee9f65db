//! Normalized trip records produced by the scraper.
//!
//! A [`TripSummary`] is created once per listing-page pass. When detail
//! extraction is requested the matching [`TripDetail`] is merged into it in
//! place. Nothing here is persisted; every scrape re-creates the records.
//!
//! Serialized field names are camelCase; enum values are SCREAMING_SNAKE_CASE.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Availability used when a listing carries no status marker.
///
/// Optimistic: a sold-out package with no marker is reported as available.
/// Kept as-is until the product owner decides otherwise.
pub const DEFAULT_AVAILABILITY: Availability = Availability::Available;

/// Itinerary value when no itinerary section exists on the page.
pub const ITINERARY_UNAVAILABLE: &str = "Roteiro não disponível";

/// Itinerary value on a fully degraded detail record.
pub const DETAIL_UNAVAILABLE: &str = "Informações não disponíveis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    SoldOut,
    Unknown,
}

impl Default for Availability {
    fn default() -> Self {
        DEFAULT_AVAILABILITY
    }
}

/// Listing-level facts for one travel package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    /// Numeric token embedded in the detail link (`uid749` → `"749"`).
    pub external_id: Option<String>,
    pub title: String,
    /// Price text exactly as shown on the listing, e.g. `"R$ 149,99"`.
    pub listing_price: Option<String>,
    pub thumbnail_url: String,
    pub detail_url: String,
    pub availability: Availability,
    #[serde(flatten)]
    pub detail: Option<TripDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
}

impl TripSummary {
    /// Attaches detail-page facts to this summary, replacing any earlier ones.
    pub fn merge_detail(&mut self, detail: TripDetail) {
        self.detail = Some(detail);
    }
}

/// Detail-page facts for one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetail {
    pub date_offers: Vec<DateOffer>,
    pub boarding_points: Vec<BoardingPoint>,
    pub itinerary: String,
    pub inclusions: Vec<String>,
    pub payment: Payment,
    pub boilerplate: Boilerplate,
    /// Partial-extraction events: fields that fell back to a default or
    /// entries that were dropped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extraction_events: Vec<ExtractionEvent>,
}

impl TripDetail {
    /// Fully defaulted record returned when the detail page could not be read.
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            date_offers: Vec::new(),
            boarding_points: Vec::new(),
            itinerary: DETAIL_UNAVAILABLE.to_string(),
            inclusions: Vec::new(),
            payment: Payment::default(),
            boilerplate: Boilerplate::degraded(),
            extraction_events: Vec::new(),
        }
    }
}

/// A local calendar date plus wall-clock time on the booking site.
///
/// Displays and serializes as `"06/09/2025, 23:30h"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TripDateTime {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TripDateTime {
    #[must_use]
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

impl fmt::Display for TripDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}h",
            self.date.format("%d/%m/%Y"),
            self.time.format("%H:%M")
        )
    }
}

impl FromStr for TripDateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidDateTime(s.to_string());
        let (date, time) = s.split_once(',').ok_or_else(invalid)?;
        let date = NaiveDate::parse_from_str(date.trim(), "%d/%m/%Y").map_err(|_| invalid())?;
        let time = time.trim().trim_end_matches(['h', 'H']);
        let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| invalid())?;
        Ok(Self { date, time })
    }
}

impl From<TripDateTime> for String {
    fn from(value: TripDateTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TripDateTime {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where a [`DateOffer`] came from, from most to least trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferProvenance {
    /// Date option paired with a matching time option.
    SelectableInput,
    /// Date option with no matching time option; times are the overnight default.
    SynthesizedTime,
    /// The page's single departure/return block.
    DepartureBlock,
    /// `"dia de mês"` text scanned from the page; dates and times are guessed.
    FreeText,
}

/// One selectable departure/return pairing. Both sides are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOffer {
    pub departure: TripDateTime,
    #[serde(rename = "return")]
    pub return_at: TripDateTime,
    pub provenance: OfferProvenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingPoint {
    /// 1-based presentation order; unique within a record.
    pub order: u32,
    pub place: String,
    /// `HH:MM`, when the page lists one.
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub per_person_amount: Option<Decimal>,
    pub payment_terms: Vec<String>,
    /// Display string such as `"R$ 149,99"`, or empty.
    pub pix_amount: String,
    /// Display string such as `"R$ 169,00"`, or empty.
    pub card_amount: String,
}

/// Fixed informational text shown with every package. Not scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boilerplate {
    pub travel_insurance: String,
    pub minimum_passenger_policy: String,
    pub boarding_tolerance: String,
    pub cancellation: String,
    pub required_document: String,
}

impl Boilerplate {
    #[must_use]
    pub fn standard() -> Self {
        let see_page = "Consulte condições na página da viagem";
        Self {
            travel_insurance: see_page.to_string(),
            minimum_passenger_policy: see_page.to_string(),
            boarding_tolerance: see_page.to_string(),
            cancellation: see_page.to_string(),
            required_document: "RG ou CNH com foto obrigatórios para embarque".to_string(),
        }
    }

    #[must_use]
    pub fn degraded() -> Self {
        let see_terms = "Consulte condições";
        Self {
            travel_insurance: see_terms.to_string(),
            minimum_passenger_policy: see_terms.to_string(),
            boarding_tolerance: see_terms.to_string(),
            cancellation: see_terms.to_string(),
            required_document: "RG ou CNH obrigatórios".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailField {
    DateOffers,
    BoardingPoints,
    Itinerary,
    Inclusions,
    Payment,
}

impl fmt::Display for DetailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetailField::DateOffers => "date_offers",
            DetailField::BoardingPoints => "boarding_points",
            DetailField::Itinerary => "itinerary",
            DetailField::Inclusions => "inclusions",
            DetailField::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// A field that extracted only partially, or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionEvent {
    pub field: DetailField,
    pub reason: String,
}

impl ExtractionEvent {
    pub fn new(field: DetailField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Result of one detail scrape: a populated record, or the documented
/// degraded default together with why it was used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExtractionOutcome {
    Extracted(TripDetail),
    Degraded { reason: String, detail: TripDetail },
}

impl ExtractionOutcome {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractionOutcome::Degraded { .. })
    }

    #[must_use]
    pub fn detail(&self) -> &TripDetail {
        match self {
            ExtractionOutcome::Extracted(detail) | ExtractionOutcome::Degraded { detail, .. } => {
                detail
            }
        }
    }

    #[must_use]
    pub fn into_detail(self) -> TripDetail {
        match self {
            ExtractionOutcome::Extracted(detail) | ExtractionOutcome::Degraded { detail, .. } => {
                detail
            }
        }
    }
}
