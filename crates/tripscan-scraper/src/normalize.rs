//! Pure normalization helpers shared by the listing and detail extractors.
//!
//! Dates and amounts on the booking site use Brazilian conventions:
//! `DD/MM/YYYY`, `"6 de setembro"`, `23:30h` / `12h40`, and `R$ 1.299,90`.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Days, NaiveDate, NaiveTime};
use regex::Regex;
use rust_decimal::Decimal;
use tripscan_core::search::MONTHS;
use tripscan_core::{Availability, DateOffer, OfferProvenance, TripDateTime};

static NUMERIC_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("valid regex"));
static DAY_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2}) de (\w+)").expect("valid regex"));
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2})h?|h(\d{2})?)").expect("valid regex")
});
static BRL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"R\$\s*(\d{1,3}(?:\.\d{3})+|\d+)(?:,(\d{1,2}))?").expect("valid regex")
});
static BARE_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,3}(?:\.\d{3})+|\d+)(?:,(\d{1,2}))?\s*$").expect("valid regex")
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").expect("valid regex"));
static UID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"uid(\d+)").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Decorative prefix the site puts in front of some titles.
const TITLE_MARKER: &str = "▶️";

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Trims and collapses internal whitespace runs to single spaces.
#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

/// Display cleanup for titles: collapses whitespace and drops the
/// decorative play marker.
#[must_use]
pub fn clean_title(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    collapsed
        .strip_prefix(TITLE_MARKER)
        .map_or(collapsed.as_str(), str::trim_start)
        .to_string()
}

#[must_use]
pub fn contains_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

/// Removes exact duplicates, keeping the first occurrence of each.
#[must_use]
pub fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Listing fields
// ---------------------------------------------------------------------------

/// Maps listing status text to an [`Availability`].
///
/// Empty text means "no marker" and yields the documented default.
#[must_use]
pub fn availability_from_status(status: &str) -> Availability {
    let upper = status.trim().to_uppercase();
    if upper.is_empty() {
        Availability::default()
    } else if upper.contains("ESGOTAD") {
        Availability::SoldOut
    } else if upper.contains("DISPON") {
        Availability::Available
    } else {
        Availability::Unknown
    }
}

/// Numeric package id embedded in a detail link, e.g. `.../uid749/...` → `"749"`.
#[must_use]
pub fn external_id_from_link(link: &str) -> Option<String> {
    UID_RE
        .captures(link)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

// ---------------------------------------------------------------------------
// Dates and times
// ---------------------------------------------------------------------------

/// Parses the first `D/M/YYYY` token in `text`.
#[must_use]
pub fn parse_numeric_date(text: &str) -> Option<NaiveDate> {
    let cap = NUMERIC_DATE_RE.captures(text)?;
    let day = cap[1].parse().ok()?;
    let month = cap[2].parse().ok()?;
    let year = cap[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a machine-readable `YYYY-MM-DD` attribute value.
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Month number for a Portuguese month name, case-insensitive.
#[must_use]
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .skip(1)
        .find(|(month, _)| *month == lower)
        .and_then(|(_, code)| code.parse().ok())
}

/// Parses a `"6 de setembro"` token; the text carries no year, so the
/// caller supplies one.
#[must_use]
pub fn parse_day_month(text: &str, year: i32) -> Option<NaiveDate> {
    let cap = DAY_MONTH_RE.captures(text)?;
    day_month_from_captures(&cap, year)
}

/// Every distinct `"D de mês"` date in `text`, in order of first appearance.
/// Tokens whose month word is not a month name are skipped.
#[must_use]
pub fn find_day_month_dates(text: &str, year: i32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = Vec::new();
    for cap in DAY_MONTH_RE.captures_iter(text) {
        if let Some(date) = day_month_from_captures(&cap, year) {
            if !dates.contains(&date) {
                dates.push(date);
            }
        }
    }
    dates
}

fn day_month_from_captures(cap: &regex::Captures<'_>, year: i32) -> Option<NaiveDate> {
    let day = cap[1].parse().ok()?;
    let month = month_number(&cap[2])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses the first time token in `text`: `23:30`, `23:30h`, `12h40`, `8h`.
#[must_use]
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let cap = TIME_RE.captures(text)?;
    let hour = cap[1].parse().ok()?;
    let minute = cap
        .get(2)
        .or_else(|| cap.get(3))
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Normalizes a time token to `HH:MM`.
#[must_use]
pub fn to_hhmm(text: &str) -> Option<String> {
    parse_time(text).map(|t| t.format("%H:%M").to_string())
}

/// Pairs a date token and a time token, e.g. `("06/09/2025", "23:30")`.
#[must_use]
pub fn parse_date_time(date: &str, time: &str) -> Option<TripDateTime> {
    Some(TripDateTime::new(parse_numeric_date(date)?, parse_time(time)?))
}

/// Departure/return times assumed when a date is known but its times are not.
///
/// Defaults to an overnight trip: departure 23:30, return 18:00 the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvernightDefault {
    pub departure: NaiveTime,
    pub return_time: NaiveTime,
    /// Calendar days between departure and return.
    pub return_after_days: u64,
}

impl Default for OvernightDefault {
    fn default() -> Self {
        Self {
            departure: NaiveTime::from_hms_opt(23, 30, 0).unwrap_or_default(),
            return_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            return_after_days: 1,
        }
    }
}

impl OvernightDefault {
    /// Builds an offer departing on `date` with the default times.
    #[must_use]
    pub fn offer_for(&self, date: NaiveDate, provenance: OfferProvenance) -> DateOffer {
        let return_date = date
            .checked_add_days(Days::new(self.return_after_days))
            .unwrap_or(date);
        DateOffer {
            departure: TripDateTime::new(date, self.departure),
            return_at: TripDateTime::new(return_date, self.return_time),
            provenance,
        }
    }
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// A parsed `R$` amount plus its canonical display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrlAmount {
    pub value: Decimal,
    /// `"R$ 1.299,90"`, with the original digits and a single space.
    pub display: String,
}

/// Parses the first `R$` amount in `text`. Text without the `R$` prefix
/// never matches.
#[must_use]
pub fn parse_brl_amount(text: &str) -> Option<Decimal> {
    find_brl_amounts(text).into_iter().next().map(|a| a.value)
}

/// Every `R$` amount in `text`, in order.
#[must_use]
pub fn find_brl_amounts(text: &str) -> Vec<BrlAmount> {
    BRL_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let integer = cap.get(1)?.as_str();
            let cents = cap.get(2).map(|m| m.as_str());
            let value = decimal_from_parts(integer, cents)?;
            let display = match cents {
                Some(c) => format!("R$ {integer},{c}"),
                None => format!("R$ {integer}"),
            };
            Some(BrlAmount { value, display })
        })
        .collect()
}

/// Parses a bare Brazilian-format number such as `"149,99"` or `"1.299,90"`.
#[must_use]
pub fn parse_decimal_br(text: &str) -> Option<Decimal> {
    let cap = BARE_AMOUNT_RE.captures(text)?;
    decimal_from_parts(cap.get(1)?.as_str(), cap.get(2).map(|m| m.as_str()))
}

fn decimal_from_parts(integer: &str, cents: Option<&str>) -> Option<Decimal> {
    let integer = integer.replace('.', "");
    let canonical = match cents {
        Some(c) => format!("{integer}.{c}"),
        None => integer,
    };
    Decimal::from_str(&canonical).ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
