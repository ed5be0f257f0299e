//! Configuration types for odte-governor

use crate::risk::RFibConfig;
use crate::score::GoPolicy;
use crate::telemetry::LogFormat;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rfib: RFibConfig,
    #[serde(default)]
    pub goscore: GoPolicy,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Install a Prometheus recorder
    #[serde(default)]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would misprice risk
    pub fn validate(&self) -> anyhow::Result<()> {
        self.rfib.validate()?;
        self.goscore.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Regime, StrategyKind};
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [rfib]
            sequence = [500, 300, 200, 100]
            reset_profit_threshold = 150.0
            warning_utilization = 0.90

            [goscore.weights]
            poe = 0.25
            pot = 0.15
            edge = 0.20
            liq_score = 0.10
            reg_score = 0.10
            pin_score = 0.10
            rfib_util = 0.10

            [goscore.thresholds]
            full = 70
            half = 55

            [[goscore.overrides]]
            regime = "convex"
            thresholds = { full = 80, half = 65 }

            [telemetry]
            log_level = "debug"
            log_format = "json"
        "#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.rfib.sequence.limit_for(2), dec!(200));
        assert_eq!(config.rfib.reset_profit_threshold, dec!(150));
        assert_eq!(config.goscore.thresholds.full, dec!(70));
        assert_eq!(
            config
                .goscore
                .thresholds_for(StrategyKind::IronCondor, Regime::Convex)
                .half,
            dec!(65)
        );
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert!(!config.telemetry.metrics_enabled);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.rfib.sequence.initial_limit(), dec!(500));
        assert_eq!(config.rfib.warning_utilization, dec!(0.90));
        assert_eq!(config.goscore, GoPolicy::default());
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_config_rejects_bad_thresholds() {
        let toml = r#"
            [goscore.thresholds]
            full = 50
            half = 60
        "#;
        assert!(Config::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_config_rejects_increasing_sequence() {
        let toml = r#"
            [rfib]
            sequence = [100, 300]
        "#;
        assert!(Config::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_config_rejects_bad_warning_level() {
        let toml = r#"
            [rfib]
            warning_utilization = 0
        "#;
        assert!(Config::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_config_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rfib]\nreset_profit_threshold = 200").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.rfib.reset_profit_threshold, dec!(200));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::from_toml_str(include_str!("../config.toml.example")).unwrap();
        assert_eq!(config.rfib.sequence.len(), 4);
    }
}
