//! Payment terms, read only from the `INVESTIMENTO` section.
//!
//! Detail pages show unrelated prices elsewhere (related packages, upsells),
//! so nothing outside the marked section is attributed to payment.

use scraper::ElementRef;
use tripscan_core::Payment;

use crate::dom::{
    ancestor_elements, child_elements, clean_text, select_all, select_first, text_content,
};
use crate::error::ExtractError;
use crate::normalize::{dedupe_preserving_order, find_brl_amounts, BrlAmount};

const MARKER: &str = "INVESTIMENTO";

/// How many parents above the marker element are tried when looking for the
/// section body next to a bare marker heading.
const MAX_SECTION_CLIMB: usize = 3;

const BLOCK_CSS: &str = "p, li, div, td, dd, h1, h2, h3, h4, h5, h6";
const HEADING_CSS: &str = "h1, h2, h3, h4, h5, h6";

/// Extracts payment terms. An absent section yields [`Payment::default`].
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if a section selector cannot be parsed.
pub fn extract_payment(root: ElementRef<'_>) -> Result<Payment, ExtractError> {
    let Some(section) = investment_section(root)? else {
        return Ok(Payment::default());
    };

    let lines = term_lines(&section)?;
    let section_text = section
        .iter()
        .map(|el| text_content(*el))
        .collect::<Vec<_>>()
        .join("\n");
    let amounts = find_brl_amounts(&section_text);
    let per_person = amounts.first();

    let mut pix = amount_on_line(&lines, &["pix"]);
    let mut card = amount_on_line(&lines, &["cartão", "cartao", "crédito", "credito"]);
    if pix.is_none() && card.is_none() {
        pix = per_person.map(|a| a.display.clone());
        card = amounts.get(1).or(per_person).map(|a| a.display.clone());
    }

    Ok(Payment {
        per_person_amount: per_person.map(|a| a.value),
        payment_terms: lines,
        pix_amount: pix.unwrap_or_default(),
        card_amount: card.unwrap_or_default(),
    })
}

/// Elements making up the section of the first marker occurrence.
///
/// The deepest element holding the marker is the whole section when it also
/// holds an amount. Otherwise the section is the marker element plus its
/// following siblings up to the next heading, taken at the nearest level
/// (climbing at most [`MAX_SECTION_CLIMB`] parents) where such siblings
/// exist. Nothing else on the page is ever part of the section.
fn investment_section(
    root: ElementRef<'_>,
) -> Result<Option<Vec<ElementRef<'_>>>, ExtractError> {
    let contains_marker = |el: ElementRef<'_>| text_content(el).to_uppercase().contains(MARKER);
    if !contains_marker(root) {
        return Ok(None);
    }

    let mut deepest = root;
    while let Some(child) = child_elements(deepest)
        .into_iter()
        .find(|child| contains_marker(*child))
    {
        deepest = child;
    }

    if has_amount(deepest) {
        return Ok(Some(vec![deepest]));
    }

    let levels = std::iter::once(deepest).chain(
        ancestor_elements(deepest)
            .take(MAX_SECTION_CLIMB)
            .take_while(|el| !matches!(el.value().name(), "body" | "html")),
    );
    for level in levels {
        let body = siblings_until_heading(level)?;
        if !body.is_empty() {
            let mut section = vec![level];
            section.extend(body);
            return Ok(Some(section));
        }
    }
    Ok(Some(vec![deepest]))
}

/// Following element siblings of `el`, stopping before the first one that is
/// or contains a heading.
fn siblings_until_heading(el: ElementRef<'_>) -> Result<Vec<ElementRef<'_>>, ExtractError> {
    let mut body = Vec::new();
    for sibling in el.next_siblings().filter_map(ElementRef::wrap) {
        if is_heading(sibling) || select_first(sibling, HEADING_CSS)?.is_some() {
            break;
        }
        body.push(sibling);
    }
    Ok(body)
}

fn is_heading(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn has_amount(el: ElementRef<'_>) -> bool {
    !find_brl_amounts(&text_content(el)).is_empty()
}

/// Text of each innermost block inside the section, minus the bare marker
/// heading. An element with no inner blocks contributes its own text.
fn term_lines(section: &[ElementRef<'_>]) -> Result<Vec<String>, ExtractError> {
    let mut lines = Vec::new();
    for el in section {
        let blocks = select_all(*el, BLOCK_CSS)?;
        if blocks.is_empty() {
            lines.push(clean_text(*el));
            continue;
        }
        for block in &blocks {
            if select_all(*block, BLOCK_CSS)?.is_empty() {
                lines.push(clean_text(*block));
            }
        }
    }

    let lines = lines
        .into_iter()
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case(MARKER))
        .collect();
    Ok(dedupe_preserving_order(lines))
}

/// Display amount on the first line mentioning any of `keywords`.
fn amount_on_line(lines: &[String], keywords: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        let lower = line.to_lowercase();
        if keywords.iter().any(|k| lower.contains(k)) {
            find_brl_amounts(line)
                .into_iter()
                .next()
                .map(|BrlAmount { display, .. }| display)
        } else {
            None
        }
    })
}
