use super::*;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Callers must hold `ENV_LOCK`.
unsafe fn clear_session_env() {
    unsafe {
        std::env::remove_var("STREAMPAY_API_URL");
        std::env::remove_var("STREAMPAY_LOGIN_TIMEOUT_SECS");
        std::env::remove_var("STREAMPAY_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("STREAMPAY_REFRESH_INTERVAL_SECS");
        std::env::remove_var("STREAMPAY_REFRESH_THROTTLE_SECS");
        std::env::remove_var("STREAMPAY_REFRESH_MAX_FAILURES");
    }
}

#[test]
fn defaults_match_refresh_policy() {
    let cfg = SessionConfig::default();
    assert_eq!(cfg.login_timeout, Duration::from_secs(15));
    assert_eq!(cfg.request_timeout, Duration::from_secs(10));
    assert_eq!(cfg.refresh_interval, Duration::from_secs(300));
    assert_eq!(cfg.refresh_throttle, Duration::from_secs(30));
    assert_eq!(cfg.max_refresh_failures, 3);
}

#[test]
fn with_api_url_strips_trailing_slash() {
    let cfg = SessionConfig::with_api_url("https://api.streampay.test/ ");
    assert_eq!(cfg.api_url, "https://api.streampay.test");
    assert_eq!(cfg.endpoint("/api/auth/me"), "https://api.streampay.test/api/auth/me");
}

#[test]
fn join_url_avoids_double_slash() {
    assert_eq!(join_url("http://h/", "/api/x"), "http://h/api/x");
    assert_eq!(join_url("http://h", "api/x"), "http://h/api/x");
}

#[test]
fn parse_max_failures_rejects_zero_and_garbage() {
    assert_eq!(parse_max_failures("5"), Ok(5));
    assert!(parse_max_failures("0").is_err());
    assert!(parse_max_failures("many").is_err());
}

#[test]
fn from_env_reads_overrides() {
    let _env = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_session_env();
        std::env::set_var("STREAMPAY_API_URL", "https://backend.test/");
        std::env::set_var("STREAMPAY_REQUEST_TIMEOUT_SECS", "4");
        std::env::set_var("STREAMPAY_REFRESH_INTERVAL_SECS", "60");
        std::env::set_var("STREAMPAY_REFRESH_MAX_FAILURES", "5");
        std::env::set_var("STREAMPAY_REFRESH_THROTTLE_SECS", "0");
    }

    let cfg = SessionConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://backend.test");
    assert_eq!(cfg.request_timeout, Duration::from_secs(4));
    assert_eq!(cfg.refresh_interval, Duration::from_secs(60));
    assert_eq!(cfg.max_refresh_failures, 5);
    assert_eq!(cfg.refresh_throttle, Duration::ZERO);
    assert_eq!(cfg.login_timeout, Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS));

    unsafe { clear_session_env() };
}

#[test]
fn from_env_rejects_blank_url() {
    let _env = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_session_env();
        std::env::set_var("STREAMPAY_API_URL", "   ");
    }

    assert!(SessionConfig::from_env().is_err());

    unsafe { clear_session_env() };
}

#[test]
fn parse_secs_enforces_minimum() {
    assert_eq!(parse_secs("STREAMPAY_REFRESH_INTERVAL_SECS", " 60 ", 1), Ok(60));
    assert_eq!(parse_secs("STREAMPAY_REFRESH_THROTTLE_SECS", "0", 0), Ok(0));
    assert_eq!(
        parse_secs("STREAMPAY_REFRESH_INTERVAL_SECS", "0", 1),
        Err(ConfigError::Parse("STREAMPAY_REFRESH_INTERVAL_SECS must be at least 1".into()))
    );
}

#[test]
fn from_env_rejects_zero_or_invalid_durations() {
    let _env = ENV_LOCK.lock().unwrap();
    for (key, raw) in [
        ("STREAMPAY_REFRESH_INTERVAL_SECS", "0"),
        ("STREAMPAY_LOGIN_TIMEOUT_SECS", "0"),
        ("STREAMPAY_REQUEST_TIMEOUT_SECS", "0"),
        ("STREAMPAY_LOGIN_TIMEOUT_SECS", "not-a-number"),
        ("STREAMPAY_REFRESH_THROTTLE_SECS", "-5"),
    ] {
        unsafe {
            clear_session_env();
            std::env::set_var(key, raw);
        }
        let err = SessionConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref m) if m.contains(key)), "{key}={raw}: {err}");
    }

    unsafe { clear_session_env() };
}
