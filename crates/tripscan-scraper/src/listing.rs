//! Listing-page extraction.
//!
//! Package containers are located with a strict cascade: the first selector
//! that matches anything is used, and no later selector is tried even if it
//! would match more. When the whole list misses, the first `div`/`section`/
//! list whose element-child count is plausible for a result grid is used.
//!
//! Each container's fields are derived independently so one missing field
//! never blocks the others.

use std::ops::RangeInclusive;

use scraper::{ElementRef, Html};
use tripscan_core::TripSummary;
use url::Url;

use crate::cascade::{first_success, non_empty, Strategy};
use crate::dom::{
    absolute_url, child_elements, first_text, select_all, select_first, text_content,
};
use crate::error::ExtractError;
use crate::normalize::{availability_from_status, clean_title, external_id_from_link};

/// Package-container selectors, most specific first.
pub const CONTAINER_SELECTORS: [&str; 6] = [
    ".package-item",
    r#"[class*="package"]"#,
    ".card, .item, .produto, .oferta",
    r#"[class*="card"], [class*="item"], [class*="produto"]"#,
    "article, .post, .entry",
    ".row .col, .grid-item, .list-item",
];

/// Tier name reported when the generic container heuristic is used.
pub const GENERIC_CONTAINER_TIER: &str = "generic-container";

const GENERIC_CONTAINER_CSS: &str = "div, section, ul, ol";
const PLAUSIBLE_CHILD_COUNT: RangeInclusive<usize> = 3..=50;

/// Containers with neither title nor price need more than this many
/// characters of text to count as a package.
const MIN_TEXT_CHARS: usize = 20;

const TITLE_TIERS: [(&str, &str); 3] = [
    ("heading", "h4, h1, h2, h3, h5, h6"),
    (
        "title-class",
        r#".title, .nome, .package-title, [class*="title"], [class*="nome"]"#,
    ),
    ("emphasis", "strong, b"),
];
const PRICE_CSS: &str = r#".class_valor, .price, .preco, .valor, [class*="price"], [class*="preco"], [class*="valor"]"#;
const STATUS_CSS: &str = ".blog-date small, .status, .disponibilidade";

/// Extracts one [`TripSummary`] per package container in `html`.
///
/// Relative image and link references are resolved against `page_url`.
#[must_use]
pub fn extract_listing(html: &str, page_url: &str) -> Vec<TripSummary> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let Some((tier, candidates)) = locate_containers(document.root_element()) else {
        tracing::info!(page_url, "no package containers found");
        return Vec::new();
    };
    tracing::debug!(page_url, tier, candidates = candidates.len(), "package containers located");

    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, el)| {
            let summary = summarize(el, base.as_ref());
            if meets_existence_threshold(&summary, el) {
                Some(summary)
            } else {
                tracing::debug!(index, tier, "candidate rejected: no title, price or text");
                None
            }
        })
        .collect()
}

/// Runs the container cascade over `root`, returning the winning tier's name
/// and its elements.
#[must_use]
pub fn locate_containers<'a>(root: ElementRef<'a>) -> Option<(&'static str, Vec<ElementRef<'a>>)> {
    let mut strategies: Vec<Strategy<'a, ElementRef<'a>, Vec<ElementRef<'a>>>> =
        CONTAINER_SELECTORS
            .iter()
            .map(|&css| {
                Strategy::new(css, move |root: &ElementRef<'a>| {
                    Ok(non_empty(select_all(*root, css)?))
                })
            })
            .collect();
    strategies.push(Strategy::new(GENERIC_CONTAINER_TIER, |root: &ElementRef<'a>| {
        generic_container(*root)
    }));

    first_success(&root, &strategies)
}

fn generic_container(root: ElementRef<'_>) -> Result<Option<Vec<ElementRef<'_>>>, ExtractError> {
    Ok(select_all(root, GENERIC_CONTAINER_CSS)?
        .into_iter()
        .map(child_elements)
        .find(|children| PLAUSIBLE_CHILD_COUNT.contains(&children.len())))
}

fn summarize(el: ElementRef<'_>, base: Option<&Url>) -> TripSummary {
    let title = clean_title(&title_of(el));
    let price = field_or_empty("price", first_text(el, PRICE_CSS));
    let status = field_or_empty("status", first_text(el, STATUS_CSS));
    let thumbnail_url = absolute_url(base, &field_or_empty("image", attr_of(el, "img", "src")));
    let detail_url = absolute_url(base, &field_or_empty("link", attr_of(el, "a[href]", "href")));

    TripSummary {
        external_id: external_id_from_link(&detail_url),
        title,
        listing_price: Some(price).filter(|p| !p.is_empty()),
        thumbnail_url,
        detail_url,
        availability: availability_from_status(&status),
        ..TripSummary::default()
    }
}

fn title_of<'a>(el: ElementRef<'a>) -> String {
    let strategies: Vec<Strategy<'a, ElementRef<'a>, String>> = TITLE_TIERS
        .iter()
        .map(|&(name, css)| {
            Strategy::new(name, move |el: &ElementRef<'a>| {
                let text = first_text(*el, css)?;
                Ok(Some(text).filter(|t| !t.is_empty()))
            })
        })
        .collect();
    first_success(&el, &strategies)
        .map(|(_, title)| title)
        .unwrap_or_default()
}

fn attr_of(el: ElementRef<'_>, css: &str, attr: &str) -> Result<String, ExtractError> {
    Ok(select_first(el, css)?
        .and_then(|found| found.value().attr(attr))
        .unwrap_or_default()
        .to_string())
}

fn field_or_empty(field: &str, value: Result<String, ExtractError>) -> String {
    value.unwrap_or_else(|e| {
        tracing::debug!(field, error = %e, "listing field extraction failed");
        String::new()
    })
}

fn meets_existence_threshold(summary: &TripSummary, el: ElementRef<'_>) -> bool {
    !summary.title.is_empty()
        || summary.listing_price.is_some()
        || text_content(el).trim().chars().count() > MIN_TEXT_CHARS
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
