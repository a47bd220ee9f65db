//! Listing search parameters and target-site URL construction.
//!
//! The booking site filters its listing page through four query parameters:
//! `mes` (month code or `all`), `destino`, `category` and `embarque`. All four
//! are always present; absent filters are sent as empty strings.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::CoreError;

/// Month names accepted by the site, in calendar order, with their codes.
pub const MONTHS: [(&str, &str); 13] = [
    ("all", "all"),
    ("janeiro", "01"),
    ("fevereiro", "02"),
    ("março", "03"),
    ("abril", "04"),
    ("maio", "05"),
    ("junho", "06"),
    ("julho", "07"),
    ("agosto", "08"),
    ("setembro", "09"),
    ("outubro", "10"),
    ("novembro", "11"),
    ("dezembro", "12"),
];

/// Optional listing filters. Values are forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilters {
    pub destination: Option<String>,
    pub category: Option<String>,
    pub departure: Option<String>,
}

/// One row of [`available_months`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthEntry {
    pub name: &'static str,
    pub code: &'static str,
    pub url: String,
}

/// Maps a month token to the site's month code.
///
/// Named months are matched case-insensitively against [`MONTHS`]; anything
/// else (e.g. an already-numeric `"09"`) is passed through unchanged.
#[must_use]
pub fn resolve_month_code(month: &str) -> String {
    let lower = month.trim().to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == lower)
        .map_or_else(|| month.trim().to_string(), |(_, code)| (*code).to_string())
}

/// Builds the listing URL for `month` and `filters` against `base_url`.
///
/// Any query string already on `base_url` is replaced.
///
/// # Errors
///
/// Returns [`CoreError::InvalidBaseUrl`] if `base_url` is not an absolute URL.
pub fn listing_url(
    base_url: &str,
    month: &str,
    filters: &ListingFilters,
) -> Result<String, CoreError> {
    let mut url = Url::parse(base_url).map_err(|e| CoreError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    let code = resolve_month_code(month);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("mes", &code)
        .append_pair("destino", filters.destination.as_deref().unwrap_or(""))
        .append_pair("category", filters.category.as_deref().unwrap_or(""))
        .append_pair("embarque", filters.departure.as_deref().unwrap_or(""));

    Ok(url.to_string())
}

/// Lists every month the site accepts, with its unfiltered listing URL.
///
/// # Errors
///
/// Returns [`CoreError::InvalidBaseUrl`] if `base_url` is not an absolute URL.
pub fn available_months(base_url: &str) -> Result<Vec<MonthEntry>, CoreError> {
    let filters = ListingFilters::default();
    MONTHS
        .iter()
        .map(|&(name, code)| {
            Ok(MonthEntry {
                name,
                code,
                url: listing_url(base_url, code, &filters)?,
            })
        })
        .collect()
}
