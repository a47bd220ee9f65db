use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://mimatourviagens.suareservaonline.com.br/44022";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
            },
        }
    };

    let env = parse_environment(&or_default("TRIPSCAN_ENV", "development"))?;
    let log_level = or_default("TRIPSCAN_LOG_LEVEL", "info");
    let base_url = or_default("TRIPSCAN_BASE_URL", DEFAULT_BASE_URL);
    let chrome_executable = lookup("TRIPSCAN_CHROME_EXECUTABLE")
        .ok()
        .filter(|p| !p.trim().is_empty());
    let headless = parse_bool("TRIPSCAN_HEADLESS", true)?;
    let user_agent = or_default("TRIPSCAN_USER_AGENT", DEFAULT_USER_AGENT);
    let viewport_width = parse_u32("TRIPSCAN_VIEWPORT_WIDTH", "1920")?;
    let viewport_height = parse_u32("TRIPSCAN_VIEWPORT_HEIGHT", "1080")?;

    let nav_max_attempts = parse_u32("TRIPSCAN_NAV_MAX_ATTEMPTS", "3")?;
    if nav_max_attempts == 0 {
        return Err(invalid(
            "TRIPSCAN_NAV_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let nav_retry_delay_ms = parse_u64("TRIPSCAN_NAV_RETRY_DELAY_MS", "2000")?;
    let nav_timeout_ms = parse_u64("TRIPSCAN_NAV_TIMEOUT_MS", "45000")?;
    let ready_timeout_ms = parse_u64("TRIPSCAN_READY_TIMEOUT_MS", "10000")?;
    let ready_selector = or_default("TRIPSCAN_READY_SELECTOR", "body");

    let listing_settle_ms = parse_u64("TRIPSCAN_LISTING_SETTLE_MS", "1000")?;
    let detail_settle_ms = parse_u64("TRIPSCAN_DETAIL_SETTLE_MS", "500")?;
    let detail_pacing_ms = parse_u64("TRIPSCAN_DETAIL_PACING_MS", "300")?;

    Ok(AppConfig {
        env,
        log_level,
        base_url,
        chrome_executable,
        headless,
        user_agent,
        viewport_width,
        viewport_height,
        nav_max_attempts,
        nav_retry_delay_ms,
        nav_timeout_ms,
        ready_timeout_ms,
        ready_selector,
        listing_settle_ms,
        detail_settle_ms,
        detail_pacing_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRIPSCAN_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
