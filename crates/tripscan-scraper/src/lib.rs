pub mod cascade;
pub mod detail;
pub mod dom;
pub mod driver;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod listing;
pub mod navigation;
pub mod normalize;
pub mod orchestrator;
pub mod session;

pub use detail::{extract_detail, DetailContext};
pub use driver::PageDriver;
pub use enrich::{enrich_all, Enricher};
pub use error::{ExtractError, ScraperError};
pub use filter::filter_by_price_range;
pub use listing::extract_listing;
pub use navigation::{navigate_with_retry, NavigationPolicy};
pub use normalize::OvernightDefault;
pub use orchestrator::{ScrapeTimings, TripScraper};
pub use session::{RenderSession, SessionOptions};
