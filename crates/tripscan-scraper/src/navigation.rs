//! Bounded-retry page navigation.
//!
//! One navigation is `Idle → Attempting → {Succeeded, Failed}`. A failed
//! attempt with budget remaining goes back to `Attempting` after a fixed
//! delay. An attempt succeeds only when the page transition resolves within
//! the navigation budget *and* the readiness marker appears within the
//! (shorter) readiness budget: a loaded document does not mean the
//! client-rendered content has mounted.

use std::time::Duration;

use tripscan_core::AppConfig;

use crate::driver::PageDriver;
use crate::error::ScraperError;

/// Retry and timeout budgets for [`navigate_with_retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPolicy {
    /// Total attempts including the first. Always at least 1.
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub nav_timeout: Duration,
    pub ready_timeout: Duration,
    pub ready_selector: String,
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(2_000),
            nav_timeout: Duration::from_millis(45_000),
            ready_timeout: Duration::from_millis(10_000),
            ready_selector: "body".to_string(),
        }
    }
}

impl NavigationPolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.nav_max_attempts.max(1),
            retry_delay: config.nav_retry_delay(),
            nav_timeout: config.nav_timeout(),
            ready_timeout: config.ready_timeout(),
            ready_selector: config.ready_selector.clone(),
        }
    }
}

/// Controller state for a single navigation.
#[derive(Debug)]
pub enum NavState {
    Idle,
    Attempting { attempt: u32 },
    Succeeded { attempt: u32 },
    Failed { attempt: u32, error: ScraperError },
}

/// A closed session cannot be recovered by navigating again.
fn is_retriable(err: &ScraperError) -> bool {
    !matches!(
        err,
        ScraperError::SessionClosed | ScraperError::SessionLaunch(_)
    )
}

/// Navigates `driver` to `url`, retrying per `policy`.
///
/// Returns the 1-based attempt number that succeeded. No attempt is made
/// after a success.
///
/// # Errors
///
/// Returns [`ScraperError::NavigationExhausted`] carrying the attempt count
/// and the last underlying error once the budget is spent, or the session
/// error itself if the session is gone.
pub async fn navigate_with_retry<D: PageDriver>(
    driver: &mut D,
    url: &str,
    policy: &NavigationPolicy,
) -> Result<u32, ScraperError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut state = NavState::Idle;

    loop {
        state = match state {
            NavState::Idle => NavState::Attempting { attempt: 1 },

            NavState::Attempting { attempt } => {
                tracing::debug!(url, attempt, max_attempts, "navigation attempt");
                match attempt_once(driver, url, policy).await {
                    Ok(()) => NavState::Succeeded { attempt },
                    Err(error) => NavState::Failed { attempt, error },
                }
            }

            NavState::Succeeded { attempt } => {
                tracing::info!(url, attempt, "navigation succeeded");
                return Ok(attempt);
            }

            NavState::Failed { attempt, error } => {
                if !is_retriable(&error) {
                    return Err(error);
                }
                if attempt >= max_attempts {
                    tracing::error!(url, attempts = attempt, error = %error, "navigation exhausted");
                    return Err(ScraperError::NavigationExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        source: Box::new(error),
                    });
                }
                tracing::warn!(
                    url,
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(policy.retry_delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "navigation attempt failed; retrying after delay"
                );
                tokio::time::sleep(policy.retry_delay).await;
                NavState::Attempting {
                    attempt: attempt + 1,
                }
            }
        };
    }
}

/// One attempt: page transition, then readiness check, each under its own budget.
async fn attempt_once<D: PageDriver>(
    driver: &mut D,
    url: &str,
    policy: &NavigationPolicy,
) -> Result<(), ScraperError> {
    tokio::time::timeout(policy.nav_timeout, driver.goto(url))
        .await
        .map_err(|_| ScraperError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: millis(policy.nav_timeout),
        })??;

    let selector = policy.ready_selector.as_str();
    tokio::time::timeout(policy.ready_timeout, driver.wait_for_selector(selector))
        .await
        .map_err(|_| ScraperError::ReadinessTimeout {
            selector: selector.to_string(),
            timeout_ms: millis(policy.ready_timeout),
        })?
        .map_err(|e| match e {
            ScraperError::SessionClosed | ScraperError::Readiness { .. } => e,
            other => ScraperError::Readiness {
                selector: selector.to_string(),
                reason: other.to_string(),
            },
        })
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
