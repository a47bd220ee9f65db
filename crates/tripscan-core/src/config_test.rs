use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TRIPSCAN_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert!(cfg.chrome_executable.is_none());
    assert!(cfg.headless);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!((cfg.viewport_width, cfg.viewport_height), (1920, 1080));
    assert_eq!(cfg.nav_max_attempts, 3);
    assert_eq!(cfg.nav_retry_delay_ms, 2000);
    assert_eq!(cfg.nav_timeout_ms, 45_000);
    assert_eq!(cfg.ready_timeout_ms, 10_000);
    assert_eq!(cfg.ready_selector, "body");
    assert_eq!(cfg.listing_settle_ms, 1000);
    assert_eq!(cfg.detail_settle_ms, 500);
    assert_eq!(cfg.detail_pacing_ms, 300);
}

#[test]
fn nav_budgets_are_independently_configurable() {
    let mut map = HashMap::new();
    map.insert("TRIPSCAN_NAV_TIMEOUT_MS", "60000");
    map.insert("TRIPSCAN_READY_TIMEOUT_MS", "2500");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.nav_timeout().as_millis(), 60_000);
    assert_eq!(cfg.ready_timeout().as_millis(), 2_500);
}

#[test]
fn headless_accepts_false() {
    let mut map = HashMap::new();
    map.insert("TRIPSCAN_HEADLESS", "false");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.headless);
}

#[test]
fn headless_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("TRIPSCAN_HEADLESS", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRIPSCAN_HEADLESS"),
        "expected InvalidEnvVar(TRIPSCAN_HEADLESS), got: {result:?}"
    );
}

#[test]
fn nav_max_attempts_invalid() {
    let mut map = HashMap::new();
    map.insert("TRIPSCAN_NAV_MAX_ATTEMPTS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRIPSCAN_NAV_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(TRIPSCAN_NAV_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn nav_max_attempts_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TRIPSCAN_NAV_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn detail_pacing_override() {
    let mut map = HashMap::new();
    map.insert("TRIPSCAN_DETAIL_PACING_MS", "750");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.detail_pacing_ms, 750);
}

#[test]
fn blank_chrome_executable_is_ignored() {
    let mut map = HashMap::new();
    map.insert("TRIPSCAN_CHROME_EXECUTABLE", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.chrome_executable.is_none());
}
