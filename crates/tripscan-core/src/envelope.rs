//! JSON envelope every outward-facing caller receives.
//!
//! Success: `{success: true, data, total?, timestamp}`.
//! Failure: `{success: false, error, timestamp}`.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScrapeEnvelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ScrapeEnvelope<T> {
    /// Wraps a single value; `total` is omitted.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ScrapeEnvelope<Vec<T>> {
    /// Wraps a list; `total` is its length.
    pub fn list(data: Vec<T>) -> Self {
        let total = data.len();
        Self {
            success: true,
            data: Some(data),
            total: Some(total),
            error: None,
            timestamp: Utc::now(),
        }
    }
}
