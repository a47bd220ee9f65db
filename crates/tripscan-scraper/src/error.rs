use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("failed to launch browser session: {0}")]
    SessionLaunch(String),

    #[error("browser session is not open")]
    SessionClosed,

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("readiness marker \"{selector}\" not found: {reason}")]
    Readiness { selector: String, reason: String },

    #[error("readiness marker \"{selector}\" did not appear within {timeout_ms}ms")]
    ReadinessTimeout { selector: String, timeout_ms: u64 },

    #[error("failed to navigate to {url} after {attempts} attempts: {source}")]
    NavigationExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<ScraperError>,
    },

    #[error("page evaluation failed: {0}")]
    Evaluate(String),

    #[error("failed to read page content: {0}")]
    Content(String),

    #[error(transparent)]
    Core(#[from] tripscan_core::CoreError),
}

/// Failure inside a single extraction step. Never escapes the extractor that
/// raised it; the field falls back to its default instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector {css:?}: {reason}")]
    Selector { css: String, reason: String },

    #[error("{0}")]
    Malformed(String),
}
