//! Configuration for quality classification and storage
//!
//! Quality thresholds are a reconstruction of the device's production tuning
//! and may need adjustment against reference firmware, so they load from a
//! JSON file at runtime instead of being hardcoded in the calibrator.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub quality: QualityThresholds,
    pub storage: StorageConfig,
}

/// Scale-deviation thresholds for calibration quality classification
///
/// A calibration's quality is judged by how far its scale sits from 1.0:
/// within `excellent` → Excellent, within `good` → Good, scale inside
/// [`acceptable_min`, `acceptable_max`] → Acceptable, anything else → Poor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Max |scale - 1| for Excellent
    pub excellent: f64,
    /// Max |scale - 1| for Good
    pub good: f64,
    /// Lower scale bound for Acceptable
    pub acceptable_min: f64,
    /// Upper scale bound for Acceptable
    pub acceptable_max: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.05,
            good: 0.15,
            acceptable_min: 0.5,
            acceptable_max: 2.0,
        }
    }
}

/// Durable storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted calibration state file
    pub state_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("calibration_state.json"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quality: QualityThresholds::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// A missing or unparseable file degrades to defaults rather than
    /// failing startup.
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
    fn test_default_thresholds() {
        let config = AppConfig::default();
        assert_eq!(config.quality.excellent, 0.05);
        assert_eq!(config.quality.good, 0.15);
        assert_eq!(config.quality.acceptable_min, 0.5);
        assert_eq!(config.quality.acceptable_max, 2.0);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/soilsense.json");
        assert_eq!(config.quality.excellent, 0.05);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.quality.good, config.quality.good);
        assert_eq!(parsed.storage.state_path, config.storage.state_path);
    }
}
