//! Job configuration for correction and validation runs
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling tolerance and algorithm changes without recompilation. A missing
//! or malformed file falls back to defaults with a warning so batch jobs
//! keep running with known-good settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub correction: CorrectionConfig,
    pub validation: ValidationConfig,
}

/// Correction run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Registered name of the correction algorithm to run
    pub algo: String,
    /// Minimum sample count per wire before the fit strategy attempts a fit
    pub min_entries: usize,
    /// Offset added to every fitted mean (fit strategy only)
    pub mean_offset: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            algo: "fit".to_string(),
            // Below this the per-wire distribution is too sparse to fit
            min_entries: 10,
            mean_offset: 0.0,
        }
    }
}

/// Validation run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Compare full records (legacy format) instead of mean only
    pub legacy_format: bool,
    /// Absolute tolerance on the mean, in the dataset's native unit
    pub mean_tolerance: f64,
    /// Absolute tolerance on the spread
    pub spread_tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            legacy_format: true,
            mean_tolerance: 0.01,
            spread_tolerance: 0.0001,
        }
    }
}

impl Default for JobConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            correction: CorrectionConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl JobConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// * Loaded configuration, or defaults (with a warning) if the file is
    ///   missing or does not parse
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
        let config = JobConfig::default();
        assert_eq!(config.correction.algo, "fit");
        assert_eq!(config.correction.min_entries, 10);
        assert!(config.validation.legacy_format);
        assert_eq!(config.validation.mean_tolerance, 0.01);
        assert_eq!(config.validation.spread_tolerance, 0.0001);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = JobConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: JobConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.correction.algo, config.correction.algo);
        assert_eq!(parsed.validation.mean_tolerance, config.validation.mean_tolerance);
        assert_eq!(parsed.validation.legacy_format, config.validation.legacy_format);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = JobConfig::load_from_file("/nonexistent/wirecal.json");
        assert_eq!(config.correction.algo, "fit");
        assert_eq!(config.validation.mean_tolerance, 0.01);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("wirecal-bad-config-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let config = JobConfig::load_from_file(&path);
        assert_eq!(config.validation.spread_tolerance, 0.0001);
        let _ = fs::remove_file(&path);
    }
}
