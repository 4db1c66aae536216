use crate::config::MlConfig;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults_when_nothing_set() {
    let config = MlConfig::from_lookup(lookup_from(&[])).unwrap();

    assert!(config.enabled);
    assert_eq!(config.min_confidence, 0.30);
    assert_eq!(config.max_confidence, 0.85);
    assert_eq!(config.request_timeout_ms, 5000);
    assert_eq!(config.health_ttl_secs, 60);
    assert_eq!(config.telemetry_url, config.service_url);
}

#[test]
fn test_overrides_and_url_normalisation() {
    let config = MlConfig::from_lookup(lookup_from(&[
        ("ML_ENABLED", "false"),
        ("ML_STRATEGY_NAME", "breakout"),
        ("ML_SYMBOL", "GBPUSD"),
        ("ML_TIMEFRAME", "M15"),
        ("ML_MIN_CONFIDENCE", "0.4"),
        ("ML_MAX_CONFIDENCE", "0.9"),
        ("ML_REQUEST_TIMEOUT_MS", "1500"),
        ("ML_SERVICE_URL", "http://scoring:8000/"),
        ("ML_TELEMETRY_URL", "https://analytics.internal/api/"),
    ]))
    .unwrap();

    assert!(!config.enabled);
    assert_eq!(config.strategy_name, "breakout");
    assert_eq!(config.symbol, "GBPUSD");
    assert_eq!(config.timeframe, "M15");
    assert_eq!(config.request_timeout().as_millis(), 1500);
    assert_eq!(config.predict_url(), "http://scoring:8000/predict");
    assert_eq!(config.health_url(), "http://scoring:8000/health");
    assert_eq!(
        config.trade_log_url(),
        "https://analytics.internal/api/ml_trade_log"
    );
    assert_eq!(
        config.trade_close_url(),
        "https://analytics.internal/api/ml_trade_close"
    );
}

#[test]
fn test_unparsable_value_is_error() {
    let result = MlConfig::from_lookup(lookup_from(&[("ML_REQUEST_TIMEOUT_MS", "soon")]));

    let err_msg = format!("{:?}", result.err().unwrap());
    assert!(err_msg.contains("ML_REQUEST_TIMEOUT_MS"));
}

#[test]
fn test_inverted_bounds_rejected() {
    let result = MlConfig::from_lookup(lookup_from(&[
        ("ML_MIN_CONFIDENCE", "0.8"),
        ("ML_MAX_CONFIDENCE", "0.5"),
    ]));
    assert!(result.is_err());
}

#[test]
fn test_bounds_outside_unit_interval_rejected() {
    let result = MlConfig::from_lookup(lookup_from(&[("ML_MAX_CONFIDENCE", "1.5")]));
    assert!(result.is_err());
}

#[test]
fn test_bad_urls_rejected() {
    assert!(MlConfig::from_lookup(lookup_from(&[("ML_SERVICE_URL", "not a url")])).is_err());
    assert!(
        MlConfig::from_lookup(lookup_from(&[("ML_TELEMETRY_URL", "ftp://host/x")])).is_err()
    );
}

#[test]
fn test_zero_timeout_rejected() {
    let config = MlConfig {
        request_timeout_ms: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_health_probe_timeout_is_capped() {
    let config = MlConfig::default();
    assert_eq!(config.health_probe_timeout().as_millis(), 1000);

    let fast = MlConfig {
        request_timeout_ms: 250,
        ..Default::default()
    };
    assert_eq!(fast.health_probe_timeout().as_millis(), 250);
}
