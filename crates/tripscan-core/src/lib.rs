pub mod app_config;
pub mod config;
pub mod envelope;
pub mod search;
pub mod trips;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use envelope::ScrapeEnvelope;
pub use search::{available_months, listing_url, resolve_month_code, ListingFilters, MonthEntry};
pub use trips::{
    Availability, BoardingPoint, Boilerplate, DateOffer, DetailField, ExtractionEvent,
    ExtractionOutcome, OfferProvenance, Payment, TripDateTime, TripDetail, TripSummary,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid trip date-time \"{0}\"")]
    InvalidDateTime(String),
}
