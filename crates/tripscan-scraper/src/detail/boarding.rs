//! Boarding points from the `EMBARQUES` card.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use tripscan_core::{BoardingPoint, DetailField, ExtractionEvent};

use super::record;
use crate::cascade::{first_success, Strategy};
use crate::dom::{clean_text, first_text, parent_element, select_all, select_first};
use crate::error::ExtractError;
use crate::normalize::to_hhmm;

static BOARDING_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}h\d{2}").expect("valid regex"));

const MARKER: &str = "EMBARQUES";
const SECTION_TIERS: [(&str, &str); 2] = [
    ("boarding-card", ".col-12.cart_destaque"),
    ("any-card", ".cart_destaque"),
];

/// Extracts boarding points in page order.
///
/// Items without a place label are dropped. Orders come from the item's
/// `"1°"` marker, falling back to its position; a repeated order is dropped
/// so orders stay unique.
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if an item selector cannot be parsed.
pub fn extract_boarding_points(
    root: ElementRef<'_>,
    events: &mut Vec<ExtractionEvent>,
) -> Result<Vec<BoardingPoint>, ExtractError> {
    let Some(section) = boarding_section(root) else {
        return Ok(Vec::new());
    };

    let mut points: Vec<BoardingPoint> = Vec::new();
    for (index, marker) in select_all(section, ".count-boarding")?.into_iter().enumerate() {
        let Some(item) = parent_element(marker) else {
            continue;
        };
        let position = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let order = parse_order(&clean_text(marker)).unwrap_or(position);

        let place = first_text(item, ".traco_route strong")?;
        if place.is_empty() {
            record(
                events,
                DetailField::BoardingPoints,
                format!("dropped boarding point {order}: no place label"),
            );
            continue;
        }
        if points.iter().any(|p| p.order == order) {
            record(
                events,
                DetailField::BoardingPoints,
                format!("dropped boarding point \"{place}\": duplicate order {order}"),
            );
            continue;
        }

        let time = select_first(item, ".traco_route small")?
            .map(clean_text)
            .and_then(|text| {
                BOARDING_TIME_RE
                    .find(&text)
                    .and_then(|m| to_hhmm(m.as_str()))
            });

        points.push(BoardingPoint { order, place, time });
    }
    Ok(points)
}

fn boarding_section<'a>(root: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let strategies: Vec<Strategy<'a, ElementRef<'a>, ElementRef<'a>>> = SECTION_TIERS
        .iter()
        .map(|&(name, css)| {
            Strategy::new(name, move |root: &ElementRef<'a>| {
                Ok(select_all(*root, css)?
                    .into_iter()
                    .find(|card| clean_text(*card).to_uppercase().contains(MARKER)))
            })
        })
        .collect();
    first_success(&root, &strategies).map(|(_, section)| section)
}

/// `"1° "` → 1. Zero is not a valid order.
fn parse_order(marker: &str) -> Option<u32> {
    let digits: String = marker.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|&n| n > 0)
}
