//! The page seam between navigation/extraction and the browser.
//!
//! [`crate::session::RenderSession`] is the production implementation. The
//! navigation controller and orchestrator only see this trait, so they can be
//! driven by a scripted page in tests.

use crate::error::ScraperError;

/// One active page. Calls are strictly sequential; implementations hold no
/// lock and must not be shared across concurrent scrapes.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Starts a page transition and resolves once the document has loaded.
    ///
    /// No timeout is applied here; the navigation controller owns budgets.
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Resolves once an element matching `selector` is present.
    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), ScraperError>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String, ScraperError>;

    /// Evaluates a script expression in the page and returns its JSON value.
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, ScraperError>;

    /// Releases the page. Calling it again, or on a never-opened page, is a no-op.
    async fn close(&mut self);
}
