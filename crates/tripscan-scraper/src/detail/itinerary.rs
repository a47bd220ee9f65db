use scraper::ElementRef;
use tripscan_core::trips::ITINERARY_UNAVAILABLE;

use super::disclosure_body;
use crate::dom::select_all;
use crate::error::ExtractError;

const MARKER: &str = "ROTEIRO";

/// Bodies this short are headings or stray labels, not an itinerary.
const MIN_BODY_CHARS: usize = 10;

/// Narrative under the `ROTEIRO` disclosure, without the heading text.
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if the summary selector cannot be parsed.
pub fn extract_itinerary(root: ElementRef<'_>) -> Result<String, ExtractError> {
    for summary in select_all(root, "summary")? {
        let Some(disclosure) = disclosure_body(summary, MARKER) else {
            continue;
        };
        let text = tidy_lines(&disclosure.body);
        if text.chars().count() > MIN_BODY_CHARS {
            return Ok(text);
        }
    }
    Ok(ITINERARY_UNAVAILABLE.to_string())
}

/// Trims every line and drops blank ones, keeping paragraph breaks.
fn tidy_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
