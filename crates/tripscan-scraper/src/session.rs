//! Headless Chromium session via `chromiumoxide`.
//!
//! One browser process, one page. Image, stylesheet and font requests are
//! blocked at the network layer to cut navigation latency; scripts and XHR
//! still load so client-rendered markup is unaffected.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, SetBlockedUrLsParams};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tripscan_core::AppConfig;

use crate::driver::PageDriver;
use crate::error::ScraperError;

/// URL patterns for resource types that never carry trip text.
const BLOCKED_RESOURCE_PATTERNS: [&str; 16] = [
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg", "*.ico", "*.bmp", "*.css", "*.woff",
    "*.woff2", "*.ttf", "*.otf", "*.eot", "*fonts.googleapis.com*", "*fonts.gstatic.com*",
];

/// Poll interval while waiting for the readiness marker.
const SELECTOR_POLL: Duration = Duration::from_millis(100);

/// Launch parameters for [`RenderSession::open`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub chrome_executable: Option<String>,
    pub headless: bool,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl SessionOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chrome_executable: config.chrome_executable.clone(),
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
        }
    }
}

/// A live browser plus its single active page.
pub struct RenderSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

impl RenderSession {
    /// Launches the browser and prepares the page.
    ///
    /// Launch failures are surfaced as-is; there is no internal retry.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::SessionLaunch`] if the browser cannot be
    /// started or the page cannot be configured.
    pub async fn open(options: &SessionOptions) -> Result<Self, ScraperError> {
        let config = build_browser_config(options)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::SessionLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler event error");
                }
            }
        });

        let mut session = Self {
            browser: Some(browser),
            page: None,
            handler: Some(handler),
        };

        match session.prepare_page(options).await {
            Ok(page) => {
                session.page = Some(page);
                tracing::info!(headless = options.headless, "render session opened");
                Ok(session)
            }
            Err(e) => {
                session.close().await;
                Err(e)
            }
        }
    }

    async fn prepare_page(&self, options: &SessionOptions) -> Result<Page, ScraperError> {
        let browser = self.browser.as_ref().ok_or(ScraperError::SessionClosed)?;
        let launch_err = |e: chromiumoxide::error::CdpError| ScraperError::SessionLaunch(e.to_string());

        let page = browser.new_page("about:blank").await.map_err(launch_err)?;
        page.set_user_agent(options.user_agent.as_str())
            .await
            .map_err(launch_err)?;
        page.execute(EnableParams::default())
            .await
            .map_err(launch_err)?;
        let patterns: Vec<String> = BLOCKED_RESOURCE_PATTERNS
            .iter()
            .map(ToString::to_string)
            .collect();
        page.execute(SetBlockedUrLsParams::new(patterns))
            .await
            .map_err(launch_err)?;
        Ok(page)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.page.is_some()
    }

    fn page(&self) -> Result<&Page, ScraperError> {
        self.page.as_ref().ok_or(ScraperError::SessionClosed)
    }
}

fn build_browser_config(options: &SessionOptions) -> Result<BrowserConfig, ScraperError> {
    let mut builder = BrowserConfig::builder()
        .viewport(Viewport {
            width: options.viewport_width,
            height: options.viewport_height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(options.viewport_width, options.viewport_height)
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--no-first-run")
        .arg("--no-zygote")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-backgrounding-occluded-windows")
        .arg("--disable-renderer-backgrounding")
        .arg("--disable-features=TranslateUI")
        .arg("--blink-settings=imagesEnabled=false");

    if !options.headless {
        builder = builder.with_head();
    }
    if let Some(exe) = &options.chrome_executable {
        builder = builder.chrome_executable(exe);
    }

    builder.build().map_err(ScraperError::SessionLaunch)
}

impl PageDriver for RenderSession {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        page.goto(url)
            .await
            .map(|_| ())
            .map_err(|e| ScraperError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        loop {
            match page.find_element(selector).await {
                Ok(_) => return Ok(()),
                Err(e) if marker_not_rendered_yet(&e) => {}
                Err(e) => {
                    return Err(ScraperError::Readiness {
                        selector: selector.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        self.page()?
            .content()
            .await
            .map_err(|e| ScraperError::Content(e.to_string()))
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, ScraperError> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::Evaluate(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| ScraperError::Evaluate(e.to_string()))
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!(error = %e, "page close error (non-fatal)");
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "browser close error (non-fatal)");
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!(error = %e, "browser wait error (non-fatal)");
            }
            tracing::info!("render session closed");
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Whether a failed marker lookup only means the node is not in the DOM yet.
/// A missing node comes back as a protocol error response; transport and
/// channel failures mean the page is gone.
fn marker_not_rendered_yet(err: &CdpError) -> bool {
    matches!(
        err,
        CdpError::Chrome(_) | CdpError::NotFound | CdpError::JavascriptException(_)
    )
}
