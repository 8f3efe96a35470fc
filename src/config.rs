use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::CompatibilityPolicy;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_bbox_padding_degrees")]
    pub bbox_padding_degrees: f64,
    #[serde(default = "default_max_detour_ratio")]
    pub max_detour_ratio: f64,
    #[serde(default = "default_detour_slack_degrees")]
    pub detour_slack_degrees: f64,
    /// Riders resolved at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            bbox_padding_degrees: default_bbox_padding_degrees(),
            max_detour_ratio: default_max_detour_ratio(),
            detour_slack_degrees: default_detour_slack_degrees(),
            concurrency: default_concurrency(),
        }
    }
}

impl MatchingSettings {
    /// Compatibility thresholds, rejecting negative or non-finite values
    pub fn policy(&self) -> Result<CompatibilityPolicy, ConfigError> {
        let thresholds = [
            ("bbox_padding_degrees", self.bbox_padding_degrees),
            ("max_detour_ratio", self.max_detour_ratio),
            ("detour_slack_degrees", self.detour_slack_degrees),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Message(format!(
                    "matching.{} must be a finite, non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(CompatibilityPolicy {
            bbox_padding_degrees: self.bbox_padding_degrees,
            max_detour_ratio: self.max_detour_ratio,
            detour_slack_degrees: self.detour_slack_degrees,
        })
    }
}

fn default_bbox_padding_degrees() -> f64 { 0.1 }
fn default_max_detour_ratio() -> f64 { 0.25 }
fn default_detour_slack_degrees() -> f64 { 0.02 }
fn default_concurrency() -> usize { 4 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: default_lookup_timeout_ms(),
            cache_size: default_cache_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl GeocoderSettings {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

fn default_lookup_timeout_ms() -> u64 { 5_000 }
fn default_cache_size() -> u64 { 10_000 }
fn default_cache_ttl_secs() -> u64 { 3_600 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSettings {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf { PathBuf::from("data/sample.toml") }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CARPOOL__, sections split by __)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CARPOOL__MATCHING__CONCURRENCY -> matching.concurrency
            .add_source(environment())
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.matching.policy()?;
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CARPOOL")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_policy() {
        let policy = MatchingSettings::default().policy().unwrap();
        assert_eq!(policy, CompatibilityPolicy::default());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            "[matching]\nmax_detour_ratio = 0.5\n\n[geocoder]\nlookup_timeout_ms = 250\n"
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.matching.max_detour_ratio, 0.5);
        assert_eq!(settings.matching.bbox_padding_degrees, 0.1);
        assert_eq!(settings.geocoder.lookup_timeout(), Duration::from_millis(250));
        assert_eq!(settings.geocoder.cache_size, 10_000);
        assert_eq!(settings.dataset.path, PathBuf::from("data/sample.toml"));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        for (key, value) in [
            ("bbox_padding_degrees", "-0.5"),
            ("max_detour_ratio", "-0.1"),
            ("detour_slack_degrees", "-0.01"),
            ("bbox_padding_degrees", "nan"),
            ("max_detour_ratio", "inf"),
        ] {
            let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            write!(file, "[matching]\n{} = {}\n", key, value).unwrap();

            let result = Settings::load_from(file.path());
            assert!(
                matches!(result, Err(ConfigError::Message(ref msg)) if msg.contains(key)),
                "{} = {} should be rejected, got {:?}",
                key,
                value,
                result
            );
        }
    }

    #[test]
    fn test_negative_padding_policy_rejected() {
        let settings = MatchingSettings {
            bbox_padding_degrees: -0.5,
            ..MatchingSettings::default()
        };
        assert!(settings.policy().is_err());
    }

    #[test]
    fn test_zero_thresholds_accepted() {
        let settings = MatchingSettings {
            bbox_padding_degrees: 0.0,
            max_detour_ratio: 0.0,
            detour_slack_degrees: 0.0,
            ..MatchingSettings::default()
        };
        assert!(settings.policy().is_ok());
    }
}
