//! End-to-end listing and detail scrapes against a scripted in-memory site.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::time::Instant;
use tripscan_core::trips::DETAIL_UNAVAILABLE;
use tripscan_core::{
    listing_url, Availability, Boilerplate, ListingFilters, OfferProvenance, ScrapeEnvelope,
    TripSummary,
};
use tripscan_scraper::{
    filter_by_price_range, DetailContext, Enricher, NavigationPolicy, OvernightDefault,
    PageDriver, ScrapeTimings, ScraperError, TripScraper,
};

const BASE: &str = "https://x.test/44022";
const HOLAMBRA: &str = "https://x.test/44022/uid749/holambra";
const ILHABELA: &str = "https://x.test/44022/uid750/ilhabela";

const LISTING_HTML: &str = r#"
<html><body>
  <div class="package-item">
    <a href="/44022/uid749/holambra"><img src="/img/holambra.jpg"></a>
    <h4>▶️ Holambra - Expoflora</h4>
    <span class="class_valor">R$ 149,99</span>
    <div class="blog-date"><small>DISPONÍVEL</small></div>
  </div>
  <div class="package-item">
    <a href="/44022/uid750/ilhabela"><img src="/img/ilhabela.jpg"></a>
    <h4>Ilhabela</h4>
    <span class="class_valor">R$ 389,00</span>
    <div class="blog-date"><small>ESGOTADO</small></div>
  </div>
  <div class="package-item">
    <h4>Pacote sob consulta</h4>
    <span class="class_valor">R$ 50,00</span>
  </div>
</body></html>
"#;

const HOLAMBRA_HTML: &str = r#"
<html><body>
  <div id="middle-wizard"><input type="radio" name="datas" data="2025-09-06"></div>
  <div class="col-12 cart_destaque">
    <h5>EMBARQUES</h5>
    <div><span class="count-boarding">1°</span><div class="traco_route"><strong>Metrô Tatuapé</strong><small>12h40</small></div></div>
  </div>
  <details><summary>ROTEIRO</summary><p>Visita à Expoflora com tempo livre.</p></details>
  <details><summary>O QUE INCLUI</summary><div>TransporteKit lancheGuia acompanhante</div></details>
  <div class="investimento">
    <h3>INVESTIMENTO</h3>
    <p>R$ 149,99 no PIX</p>
    <p>R$ 159,99 no cartão</p>
  </div>
</body></html>
"#;

/// A site whose pages are fixed strings. Navigation to a failing or unknown
/// URL errors; every call is recorded.
#[derive(Default)]
struct ScriptedSite {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    current: Option<String>,
    visits: Vec<String>,
    visited_at: Vec<Instant>,
    close_calls: u32,
}

impl ScriptedSite {
    fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn visits_to(&self, url: &str) -> usize {
        self.visits.iter().filter(|v| v.as_str() == url).count()
    }
}

impl PageDriver for ScriptedSite {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.visits.push(url.to_string());
        self.visited_at.push(Instant::now());
        if self.failing.contains(url) || !self.pages.contains_key(url) {
            self.current = None;
            return Err(ScraperError::Navigation {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn wait_for_selector(&mut self, _selector: &str) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or_else(|| ScraperError::Content("no page loaded".to_string()))
    }

    async fn evaluate(&mut self, _script: &str) -> Result<serde_json::Value, ScraperError> {
        Ok(serde_json::Value::String(
            self.current.clone().unwrap_or_default(),
        ))
    }

    async fn close(&mut self) {
        self.close_calls += 1;
        self.current = None;
    }
}

fn fast_policy() -> NavigationPolicy {
    NavigationPolicy {
        max_attempts: 2,
        retry_delay: Duration::ZERO,
        nav_timeout: Duration::from_secs(1),
        ready_timeout: Duration::from_secs(1),
        ready_selector: "body".to_string(),
    }
}

fn scraper(site: ScriptedSite) -> TripScraper<ScriptedSite> {
    TripScraper::new(site, BASE)
        .with_policy(fast_policy())
        .with_timings(ScrapeTimings::immediate())
        .with_detail_context(DetailContext {
            reference_year: 2025,
            overnight: OvernightDefault::default(),
        })
}

fn september_url() -> String {
    listing_url(BASE, "setembro", &ListingFilters::default()).unwrap()
}

#[tokio::test]
async fn listing_with_details_merges_each_detail_and_degrades_failures() {
    let site = ScriptedSite::default()
        .with_page(&september_url(), LISTING_HTML)
        .with_page(HOLAMBRA, HOLAMBRA_HTML)
        .failing(ILHABELA);
    let mut scraper = scraper(site);

    let trips = scraper
        .scrape_listing("setembro", &ListingFilters::default(), true)
        .await
        .unwrap();
    assert_eq!(trips.len(), 3);

    let holambra = &trips[0];
    assert_eq!(holambra.title, "Holambra - Expoflora");
    assert_eq!(holambra.detail_url, HOLAMBRA);
    assert_eq!(holambra.external_id.as_deref(), Some("749"));
    let detail = holambra.detail.as_ref().expect("detail merged");
    assert_eq!(detail.date_offers.len(), 1);
    assert_eq!(
        detail.date_offers[0].provenance,
        OfferProvenance::SynthesizedTime
    );
    assert_eq!(detail.boarding_points[0].time.as_deref(), Some("12:40"));
    assert_eq!(detail.itinerary, "Visita à Expoflora com tempo livre.");
    assert_eq!(
        detail.inclusions,
        vec!["Transporte", "Kit lanche", "Guia acompanhante"]
    );
    assert_eq!(
        detail.payment.per_person_amount,
        Some(Decimal::new(14_999, 2))
    );
    assert_eq!(detail.payment.card_amount, "R$ 159,99");

    let ilhabela = &trips[1];
    assert_eq!(ilhabela.availability, Availability::SoldOut);
    let degraded = ilhabela.detail.as_ref().expect("degraded detail merged");
    assert_eq!(degraded.itinerary, DETAIL_UNAVAILABLE);
    assert_eq!(degraded.boilerplate, Boilerplate::degraded());
    assert!(degraded.date_offers.is_empty());

    assert!(trips[2].detail_url.is_empty());
    assert!(trips[2].detail.is_none());

    let site = scraper.into_driver();
    assert_eq!(site.visits_to(&september_url()), 1);
    assert_eq!(site.visits_to(HOLAMBRA), 1);
    assert_eq!(site.visits_to(ILHABELA), 2, "retry budget of two");
}

#[tokio::test]
async fn listing_without_details_never_visits_detail_pages() {
    let site = ScriptedSite::default().with_page(&september_url(), LISTING_HTML);
    let mut scraper = scraper(site);

    let trips = scraper
        .scrape_listing("09", &ListingFilters::default(), false)
        .await
        .unwrap();
    assert_eq!(trips.len(), 3);
    assert!(trips.iter().all(|t| t.detail.is_none()));
    assert_eq!(scraper.into_driver().visits.len(), 1);
}

#[tokio::test]
async fn filters_are_part_of_the_listing_url() {
    let filters = ListingFilters {
        destination: Some("Holambra".to_string()),
        category: None,
        departure: Some("São Paulo".to_string()),
    };
    let url = listing_url(BASE, "all", &filters).unwrap();
    let site = ScriptedSite::default().with_page(&url, LISTING_HTML);
    let mut scraper = scraper(site);

    let trips = scraper.scrape_listing("all", &filters, false).await.unwrap();
    assert_eq!(trips.len(), 3);
    assert_eq!(scraper.into_driver().visits, vec![url]);
}

#[tokio::test]
async fn unreachable_listing_surfaces_navigation_exhausted() {
    let mut scraper = scraper(ScriptedSite::default());

    let err = scraper
        .scrape_listing("setembro", &ListingFilters::default(), true)
        .await
        .unwrap_err();
    match err {
        ScraperError::NavigationExhausted { attempts, url, .. } => {
            assert_eq!(attempts, 2);
            assert_eq!(url, september_url());
        }
        other => panic!("expected NavigationExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_base_url_is_rejected_before_navigation() {
    let mut scraper = TripScraper::new(ScriptedSite::default(), "not a url");
    let err = scraper
        .scrape_listing("all", &ListingFilters::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Core(_)));
    assert!(scraper.into_driver().visits.is_empty());
}

#[tokio::test]
async fn failed_detail_scrape_is_a_degraded_outcome_not_an_error() {
    let mut scraper = scraper(ScriptedSite::default().failing(ILHABELA));

    let outcome = scraper.scrape_detail(ILHABELA).await;
    assert!(outcome.is_degraded());
    assert_eq!(outcome.detail().itinerary, DETAIL_UNAVAILABLE);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "degraded");
    assert!(json["reason"].as_str().unwrap().contains(ILHABELA));
}

#[tokio::test]
async fn scraped_listing_serializes_into_list_envelope() {
    let site = ScriptedSite::default()
        .with_page(&september_url(), LISTING_HTML)
        .with_page(HOLAMBRA, HOLAMBRA_HTML)
        .failing(ILHABELA);
    let mut scraper = scraper(site);
    let trips = scraper
        .scrape_listing("setembro", &ListingFilters::default(), true)
        .await
        .unwrap();

    let json = serde_json::to_value(ScrapeEnvelope::list(trips)).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["total"], 3);
    let first = &json["data"][0];
    assert_eq!(first["externalId"], "749");
    assert_eq!(first["listingPrice"], "R$ 149,99");
    assert_eq!(first["dateOffers"][0]["departure"], "06/09/2025, 23:30h");
    assert_eq!(first["dateOffers"][0]["return"], "07/09/2025, 18:00h");
    assert_eq!(first["availability"], "AVAILABLE");
}

#[tokio::test]
async fn price_range_applies_to_scraped_listing() {
    let site = ScriptedSite::default().with_page(&september_url(), LISTING_HTML);
    let mut scraper = scraper(site);
    let trips = scraper
        .scrape_listing("setembro", &ListingFilters::default(), false)
        .await
        .unwrap();

    let cheap = filter_by_price_range(trips, None, Some(Decimal::from(200)));
    let titles: Vec<&str> = cheap.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Holambra - Expoflora", "Pacote sob consulta"]);
}

#[tokio::test]
async fn close_is_idempotent() {
    let mut scraper = scraper(ScriptedSite::default());
    scraper.close().await;
    scraper.close().await;
    assert_eq!(scraper.into_driver().close_calls, 2);
}

const TRIO_LISTING_HTML: &str = r#"
<html><body>
  <div class="package-item"><a href="/44022/uid801/a"></a><h4>Aparecida</h4><span class="class_valor">R$ 99,90</span></div>
  <div class="package-item"><a href="/44022/uid802/b"></a><h4>Brotas</h4><span class="class_valor">R$ 189,90</span></div>
  <div class="package-item"><a href="/44022/uid803/c"></a><h4>Cunha</h4><span class="class_valor">R$ 129,90</span></div>
</body></html>
"#;

const TRIO_DETAILS: [&str; 3] = [
    "https://x.test/44022/uid801/a",
    "https://x.test/44022/uid802/b",
    "https://x.test/44022/uid803/c",
];

#[tokio::test(start_paused = true)]
async fn detail_fetches_are_paced_between_but_not_before_the_first() {
    let mut site = ScriptedSite::default().with_page(&september_url(), TRIO_LISTING_HTML);
    for url in TRIO_DETAILS {
        site = site.with_page(url, HOLAMBRA_HTML);
    }
    let timings = ScrapeTimings::default();
    let mut scraper = TripScraper::new(site, BASE)
        .with_policy(fast_policy())
        .with_detail_context(DetailContext {
            reference_year: 2025,
            overnight: OvernightDefault::default(),
        });

    let start = Instant::now();
    let trips = scraper
        .scrape_listing("setembro", &ListingFilters::default(), true)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(trips.len(), 3);
    assert!(trips.iter().all(|t| t.detail.is_some()));
    assert_eq!(
        elapsed,
        timings.listing_settle + timings.detail_settle * 3 + timings.detail_pacing * 2
    );

    let site = scraper.into_driver();
    assert_eq!(site.visits[1..].to_vec(), TRIO_DETAILS.map(str::to_string).to_vec());
    let at: Vec<Duration> = site.visited_at.iter().map(|t| *t - start).collect();
    assert_eq!(at[0], Duration::ZERO);
    assert_eq!(at[1], timings.listing_settle, "no pause before the first detail");
    assert_eq!(
        at[2] - at[1],
        timings.detail_settle + timings.detail_pacing
    );
    assert_eq!(
        at[3] - at[2],
        timings.detail_settle + timings.detail_pacing
    );
}

struct PriceBand;

impl Enricher for PriceBand {
    type Error = String;

    async fn enrich(&self, trip: &TripSummary) -> Result<BTreeMap<String, String>, String> {
        let price = trip
            .listing_price
            .as_deref()
            .ok_or_else(|| "no listing price".to_string())?;
        Ok(BTreeMap::from([("priceBand".to_string(), price.len().to_string())]))
    }
}

#[tokio::test]
async fn enriched_listing_marks_only_the_records_that_failed() {
    let html = LISTING_HTML.replace(r#"<span class="class_valor">R$ 50,00</span>"#, "");
    let site = ScriptedSite::default().with_page(&september_url(), &html);
    let mut scraper = scraper(site);

    let trips = scraper
        .scrape_listing_enriched("setembro", &ListingFilters::default(), false, &PriceBand)
        .await
        .unwrap();

    assert_eq!(trips.len(), 3);
    assert!(trips[0].enrichment.is_some());
    assert!(trips[1].enrichment.is_some());
    assert!(trips[2].enrichment.is_none());
    assert_eq!(trips[2].enrichment_error.as_deref(), Some("no listing price"));
}
