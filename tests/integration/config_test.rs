//! Configuration loading tests

use odte_governor::config::Config;
use odte_governor::risk::RFibManager;
use odte_governor::score::{GoPolicy, GoScorer};
use rust_decimal_macros::dec;

#[test]
fn test_config_example_loads() {
    let config = Config::from_toml_str(include_str!("../../config.toml.example")).unwrap();

    let manager = RFibManager::from_config(&config.rfib).unwrap();
    assert_eq!(manager.status().daily_limit, dec!(500));
    assert!(GoScorer::new(config.goscore).is_ok());
}

#[test]
fn test_policy_json_file_replaces_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policy.json");
    std::fs::write(
        &path,
        r#"{"thresholds": {"full": 65, "half": 40},
            "overrides": [{"strategy": "iron_condor", "thresholds": {"full": 75, "half": 50}}]}"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.goscore = GoPolicy::load_json(&path).unwrap();
    assert_eq!(config.goscore.thresholds.half, dec!(40));
    assert!(config.validate().is_ok());
}

#[test]
fn test_misconfigured_policy_refuses_to_start() {
    let toml = r#"
        [goscore.weights]
        poe = 0.5
        pot = 0.5
        edge = 0.5
        liq_score = 0
        reg_score = 0
        pin_score = 0
        rfib_util = 0
    "#;
    assert!(Config::from_toml_str(toml).is_err());
}
