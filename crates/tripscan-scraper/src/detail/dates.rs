//! Date/time offers.
//!
//! Three tiers, each run only when the previous ones produced no offer:
//! 1. selectable date inputs paired with time inputs by exact date,
//! 2. the single departure/return block,
//! 3. `"D de mês"` tokens in the free text of the date wizard.
//!
//! The free-text tier never looks outside `#middle-wizard`: the rest of the
//! page carries deadlines and promo dates that are not departures.
//!
//! Every offer carries its [`OfferProvenance`] so guessed data can be told
//! apart from structured data.

use std::cell::RefCell;

use chrono::NaiveDate;
use scraper::ElementRef;
use tripscan_core::{DateOffer, DetailField, ExtractionEvent, OfferProvenance, TripDateTime};

use super::{record, DetailContext};
use crate::cascade::{first_success, non_empty, Strategy};
use crate::dom::{select_all, select_first, text_content};
use crate::error::ExtractError;
use crate::normalize::{find_day_month_dates, parse_date_time, parse_iso_date, parse_numeric_date};

const WIZARD_CSS: &str = "#middle-wizard";
const DATE_INPUT_CSS: &str = r#"input[name="datas"]"#;
const TIME_INPUT_CSS: &str = r#"input[name="horarios"]"#;
const DEPARTURE_BLOCK_CSS: &str = "#dados_saida";
const DEPARTURE_SIDE_CSS: &str = ".col-lg-6:first-child .cart_destaque div";
const RETURN_SIDE_CSS: &str = ".col-lg-6:last-child .cart_destaque div";

/// Extracts every date offer on the page.
///
/// # Errors
///
/// Returns an [`ExtractError`] only if every tier failed outright; a page
/// with no dates yields `Ok(vec![])`.
pub fn extract_date_offers<'a>(
    root: ElementRef<'a>,
    ctx: &DetailContext,
    events: &mut Vec<ExtractionEvent>,
) -> Result<Vec<DateOffer>, ExtractError> {
    let wizard = select_first(root, WIZARD_CSS)?;
    let scope = wizard.unwrap_or(root);
    let dropped = RefCell::new(Vec::new());

    let strategies: Vec<Strategy<'_, ElementRef<'a>, Vec<DateOffer>>> = vec![
        Strategy::new("selectable-input", |scope: &ElementRef<'a>| {
            Ok(non_empty(selectable_offers(
                *scope,
                ctx,
                &mut dropped.borrow_mut(),
            )?))
        }),
        Strategy::new("departure-block", |_: &ElementRef<'a>| {
            Ok(departure_block_offer(root, &mut dropped.borrow_mut())?.map(|o| vec![o]))
        }),
        Strategy::new("free-text", |_: &ElementRef<'a>| {
            Ok(wizard.and_then(|wizard| non_empty(free_text_offers(wizard, ctx))))
        }),
    ];

    let offers = first_success(&scope, &strategies).map(|(_, offers)| offers);
    drop(strategies);
    events.extend(dropped.into_inner());
    Ok(offers.unwrap_or_default())
}

/// Tier 1: `input[name="datas"][data="YYYY-MM-DD"]`, each paired with every
/// `input[name="horarios"]` whose `data_saida` is the same date.
fn selectable_offers(
    scope: ElementRef<'_>,
    ctx: &DetailContext,
    events: &mut Vec<ExtractionEvent>,
) -> Result<Vec<DateOffer>, ExtractError> {
    let date_inputs = select_all(scope, DATE_INPUT_CSS)?;
    if date_inputs.is_empty() {
        return Ok(Vec::new());
    }
    let time_inputs = select_all(scope, TIME_INPUT_CSS)?;

    let mut offers = Vec::new();
    for input in date_inputs {
        let Some(raw) = input.value().attr("data") else {
            continue;
        };
        let Some(date) = parse_iso_date(raw) else {
            record(
                events,
                DetailField::DateOffers,
                format!("unparseable date option \"{raw}\""),
            );
            continue;
        };

        let matching: Vec<ElementRef<'_>> = time_inputs
            .iter()
            .copied()
            .filter(|t| t.value().attr("data_saida").and_then(parse_numeric_date) == Some(date))
            .collect();

        if matching.is_empty() {
            offers.push(ctx.overnight.offer_for(date, OfferProvenance::SynthesizedTime));
            continue;
        }

        for time_input in matching {
            let attr = |name: &str| time_input.value().attr(name).unwrap_or_default();
            let departure = parse_date_time(attr("data_saida"), attr("horasaida"));
            let return_at = parse_date_time(attr("data_retorno"), attr("horaretorno"));
            match (departure, return_at) {
                (Some(departure), Some(return_at)) => offers.push(DateOffer {
                    departure,
                    return_at,
                    provenance: OfferProvenance::SelectableInput,
                }),
                _ => record(
                    events,
                    DetailField::DateOffers,
                    format!("dropped one-sided offer for {}", date.format("%d/%m/%Y")),
                ),
            }
        }
    }
    Ok(offers)
}

/// Tier 2: the `#dados_saida` block's departure and return cells, each
/// holding text like `"20/09/2025 \n 23:30h"`.
fn departure_block_offer(
    root: ElementRef<'_>,
    events: &mut Vec<ExtractionEvent>,
) -> Result<Option<DateOffer>, ExtractError> {
    let Some(block) = select_first(root, DEPARTURE_BLOCK_CSS)? else {
        return Ok(None);
    };
    let departure = select_first(block, DEPARTURE_SIDE_CSS)?.and_then(side_from_text);
    let return_at = select_first(block, RETURN_SIDE_CSS)?.and_then(side_from_text);

    match (departure, return_at) {
        (Some(departure), Some(return_at)) => Ok(Some(DateOffer {
            departure,
            return_at,
            provenance: OfferProvenance::DepartureBlock,
        })),
        (None, None) => Ok(None),
        _ => {
            record(
                events,
                DetailField::DateOffers,
                "dropped one-sided departure block".to_string(),
            );
            Ok(None)
        }
    }
}

/// Tier 3: every distinct `"D de mês"` date in the text, with default times.
fn free_text_offers(scope: ElementRef<'_>, ctx: &DetailContext) -> Vec<DateOffer> {
    let dates: Vec<NaiveDate> = find_day_month_dates(&text_content(scope), ctx.reference_year);
    dates
        .into_iter()
        .map(|date| ctx.overnight.offer_for(date, OfferProvenance::FreeText))
        .collect()
}

fn side_from_text(el: ElementRef<'_>) -> Option<TripDateTime> {
    let text = text_content(el);
    parse_date_time(&text, &text)
}
