use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// -----------------------------------------------------------------------
// text
// -----------------------------------------------------------------------

#[test]
fn collapse_whitespace_trims_and_joins() {
    assert_eq!(collapse_whitespace("  Holambra \n\t  Flores  "), "Holambra Flores");
}

#[test]
fn clean_title_strips_play_marker() {
    assert_eq!(clean_title("▶️ Campos do Jordão"), "Campos do Jordão");
    assert_eq!(clean_title("  Ilhabela  "), "Ilhabela");
}

#[test]
fn contains_email_detects_addresses() {
    assert!(contains_email("Dúvidas: contato@mimatour.com.br"));
    assert!(!contains_email("Kit lanche @ bordo"));
}

#[test]
fn dedupe_keeps_first_occurrence_order() {
    let items = vec!["b".to_string(), "a".to_string(), "b".to_string()];
    assert_eq!(dedupe_preserving_order(items), vec!["b", "a"]);
}

// -----------------------------------------------------------------------
// listing fields
// -----------------------------------------------------------------------

#[test]
fn availability_defaults_when_no_marker() {
    assert_eq!(availability_from_status(""), Availability::Available);
    assert_eq!(availability_from_status("   "), Availability::Available);
}

#[test]
fn availability_reads_site_markers() {
    assert_eq!(availability_from_status("ESGOTADO"), Availability::SoldOut);
    assert_eq!(availability_from_status("Esgotada"), Availability::SoldOut);
    assert_eq!(availability_from_status("DISPONÍVEL"), Availability::Available);
    assert_eq!(availability_from_status("Últimas vagas"), Availability::Unknown);
}

#[test]
fn external_id_is_parsed_from_uid_token() {
    assert_eq!(
        external_id_from_link("https://x.test/44022/uid749/holambra").as_deref(),
        Some("749")
    );
    assert_eq!(external_id_from_link("https://x.test/44022/pacote"), None);
}

// -----------------------------------------------------------------------
// dates and times
// -----------------------------------------------------------------------

#[test]
fn date_and_time_tokens_reformat_exactly() {
    let dt = parse_date_time("06/09/2025", "23:30").unwrap();
    assert_eq!(dt.to_string(), "06/09/2025, 23:30h");
}

#[test]
fn numeric_date_accepts_single_digits_and_rejects_impossible_dates() {
    assert_eq!(parse_numeric_date("Saída 6/9/2025"), Some(date(2025, 9, 6)));
    assert_eq!(parse_numeric_date("31/02/2025"), None);
    assert_eq!(parse_numeric_date("sem data"), None);
}

#[test]
fn iso_date_attribute_parses() {
    assert_eq!(parse_iso_date("2025-09-06"), Some(date(2025, 9, 6)));
    assert_eq!(parse_iso_date("06/09/2025"), None);
}

#[test]
fn day_month_tokens_use_supplied_year() {
    assert_eq!(parse_day_month("06 de setembro", 2025), Some(date(2025, 9, 6)));
    assert_eq!(parse_day_month("1 de Março", 2026), Some(date(2026, 3, 1)));
    assert_eq!(parse_day_month("3 de julhoo", 2025), None);
}

#[test]
fn find_day_month_dates_is_distinct_and_ordered() {
    let text = "Saídas em 20 de setembro, 04 de outubro e de novo 20 de setembro; 2 de tudo";
    assert_eq!(
        find_day_month_dates(text, 2025),
        vec![date(2025, 9, 20), date(2025, 10, 4)]
    );
}

#[test]
fn time_tokens_in_all_site_forms() {
    assert_eq!(parse_time("23:30"), Some(time(23, 30)));
    assert_eq!(parse_time("23:30h"), Some(time(23, 30)));
    assert_eq!(parse_time("Embarque 12h40"), Some(time(12, 40)));
    assert_eq!(parse_time("8h"), Some(time(8, 0)));
    assert_eq!(parse_time("25:00"), None);
    assert_eq!(to_hhmm("7h05").as_deref(), Some("07:05"));
}

#[test]
fn overnight_default_returns_next_day() {
    let offer = OvernightDefault::default().offer_for(date(2025, 9, 6), OfferProvenance::SynthesizedTime);
    assert_eq!(offer.departure.to_string(), "06/09/2025, 23:30h");
    assert_eq!(offer.return_at.to_string(), "07/09/2025, 18:00h");
    assert_eq!(offer.provenance, OfferProvenance::SynthesizedTime);
}

#[test]
fn overnight_default_crosses_month_and_year() {
    let offer = OvernightDefault::default().offer_for(date(2025, 12, 31), OfferProvenance::FreeText);
    assert_eq!(offer.return_at.date, date(2026, 1, 1));
}

#[test]
fn overnight_default_is_overridable() {
    let same_day = OvernightDefault {
        departure: time(6, 0),
        return_time: time(21, 0),
        return_after_days: 0,
    };
    let offer = same_day.offer_for(date(2025, 9, 6), OfferProvenance::SynthesizedTime);
    assert_eq!(offer.return_at.to_string(), "06/09/2025, 21:00h");
}

// -----------------------------------------------------------------------
// amounts
// -----------------------------------------------------------------------

#[test]
fn brl_amount_parses_decimal_comma() {
    assert_eq!(parse_brl_amount("R$ 149,99"), Some(Decimal::new(14_999, 2)));
}

#[test]
fn brl_amount_requires_currency_prefix() {
    assert_eq!(parse_brl_amount("149,99"), None);
    assert_eq!(parse_brl_amount("Total 149,99 no pix"), None);
}

#[test]
fn brl_amount_handles_thousands_and_whole_values() {
    assert_eq!(parse_brl_amount("R$1.299,90"), Some(Decimal::new(129_990, 2)));
    assert_eq!(parse_brl_amount("por R$ 169"), Some(Decimal::from(169)));
}

#[test]
fn find_brl_amounts_normalizes_display() {
    let amounts = find_brl_amounts("R$149,99 no pix ou R$  169,00 no cartão");
    let displays: Vec<&str> = amounts.iter().map(|a| a.display.as_str()).collect();
    assert_eq!(displays, vec!["R$ 149,99", "R$ 169,00"]);
    assert_eq!(amounts[1].value, Decimal::new(16_900, 2));
}

#[test]
fn bare_decimal_parses_brazilian_format() {
    assert_eq!(parse_decimal_br("1.299,90"), Some(Decimal::new(129_990, 2)));
    assert_eq!(parse_decimal_br(" 80 "), Some(Decimal::from(80)));
    assert_eq!(parse_decimal_br("80 reais"), None);
}
