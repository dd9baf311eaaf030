//! Configuration management for calibration runs
//!
//! This module provides runtime configuration loading from JSON files, so
//! thresholds and the timeout can be tuned per device without recompiling.
//! Missing fields fall back to the stock driver defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::calibration::Thresholds;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// Calibration run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Pixels within which a repeated tap counts as a double click (0 = off)
    pub threshold_doubleclick: u32,
    /// Pixels of allowed misalignment between corner taps (0 = off)
    pub threshold_misclick: u32,
    /// Time without clicks before the session aborts
    pub timeout_ms: u64,
    /// Period of the timeout watchdog tick
    pub tick_ms: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            threshold_doubleclick: 7,
            threshold_misclick: 15,
            timeout_ms: 15_000,
            tick_ms: 100,
        }
    }
}

impl CalibrationConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.threshold_doubleclick, self.threshold_misclick)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or
    /// the JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.calibration.threshold_doubleclick, 7);
        assert_eq!(config.calibration.threshold_misclick, 15);
        assert_eq!(config.calibration.timeout(), Duration::from_secs(15));
        assert_eq!(config.calibration.tick(), Duration::from_millis(100));
    }

    #[test]
    fn test_thresholds() {
        let config = CalibrationConfig::default();
        assert_eq!(config.thresholds(), Thresholds::new(7, 15));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "calibration": { "threshold_misclick": 0 } }"#).unwrap();
        assert_eq!(config.calibration.threshold_misclick, 0);
        assert_eq!(config.calibration.threshold_doubleclick, 7);
        assert_eq!(config.calibration.timeout_ms, 15_000);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/calibrator_config.json");
        assert_eq!(config.calibration.threshold_misclick, 15);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let config = CalibrationConfig {
            tick_ms: 0,
            ..CalibrationConfig::default()
        };
        assert_eq!(config.tick(), Duration::from_millis(1));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.calibration.threshold_misclick,
            config.calibration.threshold_misclick
        );
    }
}
