//! moduleflow CLI configuration
//!
//! Loaded from a TOML or JSON file chosen by extension; every field falls
//! back to its default when absent.

use crate::error::{CliError, Result};
use moduleflow_core::FrameworkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Location the in-memory history starts at
    pub initial_url: String,
    /// Print each shipped log batch to stdout
    pub print_log_batches: bool,
    /// Engine configuration
    pub framework: FrameworkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_url: "/".to_string(),
            print_log_batches: true,
            framework: FrameworkConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`; `.json` files are parsed as JSON, anything else as TOML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial_url.starts_with('/') {
            return Err(CliError::Config(format!(
                "initial_url must be an absolute path, got {:?}",
                self.initial_url
            )));
        }
        self.framework.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = AppConfig::from_toml(
            r#"
            initial_url = "/shop"

            [framework]
            default_tick_interval_secs = 2

            [framework.logger]
            sending_frequency_secs = 10
            masked_keywords = ["password", "token"]
            "#,
        )
        .unwrap();

        assert_eq!(config.initial_url, "/shop");
        assert_eq!(config.framework.default_tick_interval_secs, 2);
        let logger = config.framework.logger.unwrap();
        assert_eq!(logger.sending_frequency_secs, 10);
        assert_eq!(logger.server_url, "/ajax/log");
        assert!(logger.flush_enabled);
        assert!(config.print_log_batches);
    }

    #[test]
    fn test_json_config() {
        let config = AppConfig::from_json(r#"{"framework": {"logger": null}, "initial_url": "/"}"#).unwrap();
        assert!(config.framework.logger.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relative_initial_url_rejected() {
        let config = AppConfig {
            initial_url: "shop".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let mut config = AppConfig::default();
        config.framework.default_tick_interval_secs = 0;
        assert!(matches!(config.validate(), Err(CliError::Framework(_))));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = AppConfig {
            framework: FrameworkConfig::testing(),
            ..AppConfig::default()
        };
        let reparsed = AppConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }
}
