use rust_decimal::Decimal;
use tripscan_core::TripSummary;

use crate::normalize::parse_brl_amount;

/// Keeps trips whose listing price lies in `[min, max]`. Either bound may be
/// absent. Trips with no parseable `R$` price are dropped.
#[must_use]
pub fn filter_by_price_range(
    trips: Vec<TripSummary>,
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Vec<TripSummary> {
    trips
        .into_iter()
        .filter(|trip| {
            let Some(price) = trip.listing_price.as_deref().and_then(parse_brl_amount) else {
                tracing::debug!(title = %trip.title, "no parseable listing price; excluded");
                return false;
            };
            min.is_none_or(|min| price >= min) && max.is_none_or(|max| price <= max)
        })
        .collect()
}
