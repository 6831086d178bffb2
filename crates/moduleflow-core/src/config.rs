//! Framework configuration
//!
//! Configuration structures with serde support so hosts can load them from
//! files, plus presets for common environments.

use crate::errors::{FrameworkError, FrameworkResult};
use core::time::Duration;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;

// ----------------------------------------------------------------------------
// Logger Configuration
// ----------------------------------------------------------------------------

/// Configuration of the business event logger.
///
/// When present, decorated handlers record their invocations and, if
/// `flush_enabled`, collected events are sent to `server_url` every
/// `sending_frequency_secs` seconds as `{"events": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Endpoint receiving log batches
    pub server_url: String,
    /// Seconds between flushes
    pub sending_frequency_secs: u64,
    /// Regex patterns of argument keys whose values are masked in logs,
    /// matched case-insensitively
    pub masked_keywords: Vec<String>,
    /// Whether the flush task runs at all
    pub flush_enabled: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            server_url: "/ajax/log".to_string(),
            sending_frequency_secs: 20,
            masked_keywords: vec!["password".to_string()],
            flush_enabled: true,
        }
    }
}

impl LoggerConfig {
    pub fn sending_frequency(&self) -> Duration {
        Duration::from_secs(self.sending_frequency_secs)
    }

    /// Compile `masked_keywords` into case-insensitive patterns
    pub fn compile_masks(&self) -> FrameworkResult<Vec<Regex>> {
        self.masked_keywords
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| FrameworkError::InvalidMaskPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    pub fn validate(&self) -> FrameworkResult<()> {
        if self.flush_enabled && self.sending_frequency_secs == 0 {
            return Err(FrameworkError::config_error(
                "sending_frequency_secs must be greater than zero",
            ));
        }
        self.compile_masks().map(|_| ())
    }
}

// ----------------------------------------------------------------------------
// Framework Configuration
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Prompt shown by the host when navigation is prevented
    pub navigation_prevention_message: String,
    /// Tick cadence for `onTick` hooks without an explicit interval
    pub default_tick_interval_secs: u64,
    /// Business logging; `None` disables the log decorator entirely
    pub logger: Option<LoggerConfig>,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            navigation_prevention_message: "Are you sure you want to leave this page?"
                .to_string(),
            default_tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            logger: None,
        }
    }
}

impl FrameworkConfig {
    /// Logging on, flushing off; suitable for tests inspecting the log queue
    pub fn testing() -> Self {
        Self {
            logger: Some(LoggerConfig {
                flush_enabled: false,
                ..LoggerConfig::default()
            }),
            ..Self::default()
        }
    }

    pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn default_tick_interval(&self) -> Duration {
        Duration::from_secs(self.default_tick_interval_secs)
    }

    pub fn validate(&self) -> FrameworkResult<()> {
        if self.default_tick_interval_secs == 0 {
            return Err(FrameworkError::config_error(
                "default_tick_interval_secs must be greater than zero",
            ));
        }
        match &self.logger {
            Some(logger) => logger.validate(),
            None => Ok(()),
        }
    }
}

// ----------------------------------------------------------------------------
// Lifecycle Attachment Options
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachLifecycleOption {
    /// Keep the module's state slice when the component unmounts
    pub retain_state_on_leave: bool,
}
