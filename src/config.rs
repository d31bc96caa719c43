//! Application configuration.
//!
//! Holds defaults a caller can fall back to when constructing a
//! `TrainingPlan` — a default rounding policy, default deload thresholds —
//! plus the logging configuration. None of this is consulted by the pure
//! engine itself; every value here is just a convenience default a host
//! application can copy into the value trees it actually passes to
//! `recommend_session`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::LogConfig;
use crate::model::{LoadRoundingPolicy, RoundingMode, Unit};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub metadata: ConfigMetadata,
    pub defaults: DefaultPolicies,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Default policy parameters a new `TrainingPlan` is seeded with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultPolicies {
    pub rounding: LoadRoundingPolicy,
    pub readiness_threshold: i32,
    pub low_readiness_days_required: u32,
    pub scheduled_deload_weeks: u32,
}

impl Default for DefaultPolicies {
    fn default() -> Self {
        Self {
            rounding: LoadRoundingPolicy {
                increment: dec!(5),
                unit: Unit::Pounds,
                mode: RoundingMode::Nearest,
            },
            readiness_threshold: 50,
            low_readiness_days_required: 3,
            scheduled_deload_weeks: 4,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            metadata: ConfigMetadata::default(),
            defaults: DefaultPolicies::default(),
            logging: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.rounding.increment <= Decimal::ZERO {
            return Err(ConfigError::InvalidRoundingIncrement(
                self.defaults.rounding.increment,
            ));
        }
        if !(0..=100).contains(&self.defaults.readiness_threshold) {
            return Err(ConfigError::InvalidReadinessThreshold(
                self.defaults.readiness_threshold,
            ));
        }
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.as_ref().display()))?;
        let config: EngineConfig =
            toml::from_str(&content).with_context(|| "failed to parse TOML configuration")?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
        }
        let toml_content =
            toml::to_string_pretty(self).with_context(|| "failed to serialize configuration")?;
        fs::write(&path, toml_content)
            .with_context(|| format!("failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liftplan")
            .join("config.toml")
    }

    pub fn load_or_default() -> Self {
        match Self::load_from_file(Self::default_config_path()) {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_increment_is_invalid() {
        let mut cfg = EngineConfig::default();
        cfg.defaults.rounding.increment = Decimal::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_readiness_threshold_is_invalid() {
        let mut cfg = EngineConfig::default();
        cfg.defaults.readiness_threshold = 150;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = EngineConfig::default();
        cfg.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.defaults.readiness_threshold, cfg.defaults.readiness_threshold);
    }
}
