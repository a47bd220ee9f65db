//! "What's included" list.
//!
//! Tiers, in order: the `INCLUI` disclosure, an icon/bold table, then known
//! inclusion phrases found anywhere in the page text. Each tier's items are
//! sanitized before the cascade decides whether it matched, so a tier that
//! only produced mis-scoped text falls through to the next one.

use std::cell::RefCell;

use scraper::ElementRef;
use tripscan_core::{DetailField, ExtractionEvent};

use super::{disclosure_body, record, Disclosure};
use crate::cascade::{first_success, non_empty, Strategy};
use crate::dom::{clean_text, select_all, select_first, text_content};
use crate::error::ExtractError;
use crate::normalize::{collapse_whitespace, contains_email, dedupe_preserving_order};

pub const MAX_INCLUSIONS: usize = 10;

const MARKER: &str = "INCLUI";
const INCLUDED_PREFIX: &str = "Incluso:";
const SEPARATORS: [char; 5] = ['\n', ';', '•', '-', '*'];

/// Phrases checked for literal presence when no structured list exists.
const KNOWN_INCLUSIONS: [&str; 10] = [
    "Transporte",
    "Kit lanche",
    "Kit lanchinho",
    "Guia acompanhante",
    "Monitor",
    "Taxa de entrada",
    "Seguro viagem",
    "Ar condicionado",
    "Taxa de preservação ambiental",
    "Seguro transporte",
];

/// Extracts up to [`MAX_INCLUSIONS`] distinct inclusion entries.
///
/// Entries containing an email address or outside 3..=99 characters are
/// discarded, never truncated.
///
/// # Errors
///
/// Never fails today; every tier's selector errors fall through the cascade.
pub fn extract_inclusions<'a>(
    root: ElementRef<'a>,
    events: &mut Vec<ExtractionEvent>,
) -> Result<Vec<String>, ExtractError> {
    let discarded = RefCell::new(Vec::new());
    let sanitized = |tier: &str, items: Vec<String>| -> Option<Vec<String>> {
        non_empty(sanitize(tier, items, &mut discarded.borrow_mut()))
    };

    let strategies: Vec<Strategy<'_, ElementRef<'a>, Vec<String>>> = vec![
        Strategy::new("disclosure", |root: &ElementRef<'a>| {
            Ok(sanitized("disclosure", disclosure_items(*root)?))
        }),
        Strategy::new("icon-table", |root: &ElementRef<'a>| {
            Ok(sanitized("icon-table", table_items(*root)?))
        }),
        Strategy::new("known-phrases", |root: &ElementRef<'a>| {
            Ok(sanitized("known-phrases", known_phrases(*root)))
        }),
    ];

    let items = first_success(&root, &strategies).map(|(_, items)| items);
    drop(strategies);
    events.extend(discarded.into_inner());

    let mut items = items.unwrap_or_default();
    items.truncate(MAX_INCLUSIONS);
    Ok(items)
}

/// Drops mis-scoped entries and duplicates, recording what was discarded.
fn sanitize(tier: &str, items: Vec<String>, events: &mut Vec<ExtractionEvent>) -> Vec<String> {
    let (kept, rejected): (Vec<String>, Vec<String>) = items
        .into_iter()
        .map(|item| collapse_whitespace(&item))
        .partition(|item| {
            let len = item.chars().count();
            (3..=99).contains(&len) && !contains_email(item)
        });
    if !rejected.is_empty() {
        record(
            events,
            DetailField::Inclusions,
            format!("{tier}: discarded {} mis-scoped entries", rejected.len()),
        );
    }
    dedupe_preserving_order(kept)
}

fn disclosure_items(root: ElementRef<'_>) -> Result<Vec<String>, ExtractError> {
    let Some(Disclosure { body, in_details }) = select_all(root, "summary")?
        .into_iter()
        .find_map(|summary| disclosure_body(summary, MARKER))
    else {
        return Ok(Vec::new());
    };

    if !in_details {
        return Ok(split_on_separators(&body)
            .into_iter()
            .filter(|item| within(item, 2, 100))
            .collect());
    }

    let by_capitals: Vec<String> = split_before_capitals(&body, 1)
        .into_iter()
        .map(|piece| {
            let piece = piece.trim();
            piece.strip_prefix(INCLUDED_PREFIX).unwrap_or(piece).trim().to_string()
        })
        .filter(|item| within(item, 2, 80) && !is_noise(item))
        .collect();
    if by_capitals.len() > 1 {
        return Ok(by_capitals);
    }

    let stripped = body.replace(INCLUDED_PREFIX, "");
    Ok(split_on_separators(&stripped)
        .iter()
        .flat_map(|piece| split_before_capitals(piece, 3))
        .map(|item| item.trim().to_string())
        .filter(|item| within(item, 2, 100) && !is_noise(item))
        .collect())
}

fn table_items(root: ElementRef<'_>) -> Result<Vec<String>, ExtractError> {
    let mut items = Vec::new();
    for row in select_all(root, "table tr")? {
        let cells = select_all(row, "td")?;
        let [icon, text, ..] = cells.as_slice() else {
            continue;
        };
        if select_first(*icon, "svg")?.is_none() {
            continue;
        }
        if let Some(bold) = select_first(*text, "b")? {
            let item = clean_text(bold);
            if within(&item, 2, 100) {
                items.push(item);
            }
        }
    }
    Ok(items)
}

fn known_phrases(root: ElementRef<'_>) -> Vec<String> {
    let page = text_content(root).to_lowercase();
    KNOWN_INCLUSIONS
        .iter()
        .filter(|phrase| page.contains(&phrase.to_lowercase()))
        .map(ToString::to_string)
        .collect()
}

/// Exclusive character-length bounds on the trimmed item.
fn within(item: &str, min_exclusive: usize, max_exclusive: usize) -> bool {
    let len = item.trim().chars().count();
    len > min_exclusive && len < max_exclusive
}

/// Pure numbers and short all-caps labels are layout debris.
fn is_noise(item: &str) -> bool {
    let item = item.trim();
    let all_digits = !item.is_empty() && item.chars().all(|c| c.is_ascii_digit());
    let len = item.chars().count();
    let short_caps = (1..=5).contains(&len)
        && item
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_whitespace());
    all_digits || short_caps
}

fn split_on_separators(text: &str) -> Vec<String> {
    text.split(|c: char| SEPARATORS.contains(&c))
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Splits `text` before every ASCII capital followed by at least
/// `min_lower` ASCII lowercase letters (`"TransporteKit lanche"` →
/// `["Transporte", "Kit lanche"]`).
fn split_before_capitals(text: &str, min_lower: usize) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut cuts = vec![0];
    for (pos, &(byte, c)) in chars.iter().enumerate().skip(1) {
        let followed_by_lower = chars[pos + 1..]
            .iter()
            .take(min_lower)
            .filter(|(_, next)| next.is_ascii_lowercase())
            .count()
            == min_lower;
        if c.is_ascii_uppercase() && followed_by_lower {
            cuts.push(byte);
        }
    }
    cuts.push(text.len());
    cuts.windows(2).map(|w| &text[w[0]..w[1]]).collect()
}
