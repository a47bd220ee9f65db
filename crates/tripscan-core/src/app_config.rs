use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Listing endpoint of the booking site, without query string.
    pub base_url: String,
    pub chrome_executable: Option<String>,
    pub headless: bool,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub nav_max_attempts: u32,
    pub nav_retry_delay_ms: u64,
    pub nav_timeout_ms: u64,
    pub ready_timeout_ms: u64,
    /// CSS selector that must be present before a page counts as rendered.
    pub ready_selector: String,
    pub listing_settle_ms: u64,
    pub detail_settle_ms: u64,
    /// Delay inserted between successive detail-page fetches.
    pub detail_pacing_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_millis(self.nav_timeout_ms)
    }

    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    #[must_use]
    pub fn nav_retry_delay(&self) -> Duration {
        Duration::from_millis(self.nav_retry_delay_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("base_url", &self.base_url)
            .field("chrome_executable", &self.chrome_executable)
            .field("headless", &self.headless)
            .field("user_agent", &self.user_agent)
            .field(
                "viewport",
                &format_args!("{}x{}", self.viewport_width, self.viewport_height),
            )
            .field("nav_max_attempts", &self.nav_max_attempts)
            .field("nav_retry_delay_ms", &self.nav_retry_delay_ms)
            .field("nav_timeout_ms", &self.nav_timeout_ms)
            .field("ready_timeout_ms", &self.ready_timeout_ms)
            .field("ready_selector", &self.ready_selector)
            .field("listing_settle_ms", &self.listing_settle_ms)
            .field("detail_settle_ms", &self.detail_settle_ms)
            .field("detail_pacing_ms", &self.detail_pacing_ms)
            .finish()
    }
}
