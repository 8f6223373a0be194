//! Configuration for home location inference
//!
//! Thresholds, tie-break policy and the column mapping used by the CSV
//! adapter. All of it can be loaded from a TOML file; every section is
//! optional and falls back to the documented defaults.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::HomeLocationError;

/// How to choose between zones tied on the maximal record count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Smallest zone identifier wins
    #[default]
    SmallestZone,
    /// Zone whose (user, zone) pair appears first in the input wins
    FirstSeen,
}

/// Qualification thresholds and ranking policy
///
/// A (user, zone) group qualifies as a home candidate only if it has more
/// than `min_tweets` records, spread over more than `min_days` distinct dates
/// and more than `min_hours` distinct hours of the day. All comparisons are
/// strict.
///
/// # Example
/// ```
/// use homeloc::config::HomeLocationConfig;
///
/// let config = HomeLocationConfig::default();
/// assert_eq!(config.min_tweets, 10);
/// assert_eq!(config.min_days, 10);
/// assert_eq!(config.min_hours, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeLocationConfig {
    /// Records at a zone must exceed this count
    pub min_tweets: i64,
    /// Distinct dates at a zone must exceed this count
    pub min_days: i64,
    /// Distinct hours of day at a zone must exceed this count (0..=24)
    pub min_hours: i64,
    pub tie_break: TieBreak,
}

impl Default for HomeLocationConfig {
    fn default() -> Self {
        Self {
            min_tweets: 10,
            min_days: 10,
            min_hours: 8,
            tie_break: TieBreak::SmallestZone,
        }
    }
}

/// Validated thresholds, ready for the assigner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_tweets: usize,
    pub min_days: usize,
    pub min_hours: usize,
    pub tie_break: TieBreak,
}

impl HomeLocationConfig {
    /// Demands a longer, denser activity history per zone
    pub fn strict() -> Self {
        Self {
            min_tweets: 20,
            min_days: 20,
            min_hours: 12,
            tie_break: TieBreak::SmallestZone,
        }
    }

    /// Accepts sparse users, at the cost of noisier homes
    pub fn permissive() -> Self {
        Self {
            min_tweets: 5,
            min_days: 5,
            min_hours: 4,
            tie_break: TieBreak::SmallestZone,
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    /// [`HomeLocationError::InvalidConfiguration`] if any threshold is
    /// negative or `min_hours` exceeds 24.
    pub fn validate(&self) -> Result<Thresholds, HomeLocationError> {
        let non_negative = |parameter: &'static str, value: i64| {
            usize::try_from(value).map_err(|_| HomeLocationError::InvalidConfiguration {
                parameter,
                value,
                reason: "must be >= 0",
            })
        };

        let min_tweets = non_negative("min_tweets", self.min_tweets)?;
        let min_days = non_negative("min_days", self.min_days)?;
        let min_hours = non_negative("min_hours", self.min_hours)?;
        if min_hours > 24 {
            return Err(HomeLocationError::InvalidConfiguration {
                parameter: "min_hours",
                value: self.min_hours,
                reason: "must be in 0..=24",
            });
        }

        Ok(Thresholds {
            min_tweets,
            min_days,
            min_hours,
            tie_break: self.tie_break,
        })
    }
}

/// Names of the input columns carrying each record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub user: String,
    pub zone: String,
    pub date: String,
    pub hour: String,
    /// `chrono` format string for the date column
    pub date_format: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            user: "u_id".to_string(),
            zone: "OBJECTID".to_string(),
            date: "date".to_string(),
            hour: "hour".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Top-level configuration file
///
/// # Example TOML
/// ```toml
/// home_column = "home_tract"
///
/// [thresholds]
/// min_tweets = 10
/// min_days = 10
/// min_hours = 8
/// tie_break = "first-seen"
///
/// [columns]
/// user = "u_id"
/// zone = "GEOID"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomelocConfig {
    pub thresholds: HomeLocationConfig,
    pub columns: ColumnMapping,
    /// Name of the column appended to CSV output
    pub home_column: String,
}

impl Default for HomelocConfig {
    fn default() -> Self {
        Self {
            thresholds: HomeLocationConfig::default(),
            columns: ColumnMapping::default(),
            home_column: "home_zone".to_string(),
        }
    }
}

impl HomelocConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML for this
    /// schema. Threshold values are not validated here.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse homeloc TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let thresholds = HomeLocationConfig::default().validate().unwrap();
        assert_eq!(thresholds.min_tweets, 10);
        assert_eq!(thresholds.min_days, 10);
        assert_eq!(thresholds.min_hours, 8);
        assert_eq!(thresholds.tie_break, TieBreak::SmallestZone);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(HomeLocationConfig::strict().validate().is_ok());
        assert!(HomeLocationConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = HomeLocationConfig {
            min_days: -1,
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            HomeLocationError::InvalidConfiguration {
                parameter: "min_days",
                value: -1,
                reason: "must be >= 0",
            }
        );
    }

    #[test]
    fn test_min_hours_upper_bound() {
        let at_bound = HomeLocationConfig {
            min_hours: 24,
            ..Default::default()
        };
        assert!(at_bound.validate().is_ok());

        let above = HomeLocationConfig {
            min_hours: 25,
            ..Default::default()
        };
        assert!(matches!(
            above.validate(),
            Err(HomeLocationError::InvalidConfiguration {
                parameter: "min_hours",
                value: 25,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_thresholds_are_valid() {
        let config = HomeLocationConfig {
            min_tweets: 0,
            min_days: 0,
            min_hours: 0,
            tie_break: TieBreak::FirstSeen,
        };
        let thresholds = config.validate().unwrap();
        assert_eq!(thresholds.min_tweets, 0);
        assert_eq!(thresholds.tie_break, TieBreak::FirstSeen);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = HomelocConfig::from_toml_str("").unwrap();
        assert_eq!(config, HomelocConfig::default());
        assert_eq!(config.columns.zone, "OBJECTID");
        assert_eq!(config.home_column, "home_zone");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = HomelocConfig::from_toml_str(
            r#"
home_column = "home_tract"

[thresholds]
min_days = 3
tie_break = "first-seen"

[columns]
zone = "GEOID"
"#,
        )
        .unwrap();

        assert_eq!(config.home_column, "home_tract");
        assert_eq!(config.thresholds.min_days, 3);
        assert_eq!(config.thresholds.min_tweets, 10);
        assert_eq!(config.thresholds.tie_break, TieBreak::FirstSeen);
        assert_eq!(config.columns.zone, "GEOID");
        assert_eq!(config.columns.user, "u_id");
    }

    #[test]
    fn test_toml_negative_value_parses_then_fails_validation() {
        let config = HomelocConfig::from_toml_str("[thresholds]\nmin_tweets = -5\n").unwrap();
        assert!(config.thresholds.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_syntax() {
        let result = HomelocConfig::from_toml_str("[thresholds\nmin_days = 3");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\nmin_hours = 2").unwrap();

        let config = HomelocConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.thresholds.min_hours, 2);
    }

    #[test]
    fn test_missing_file_error_mentions_path() {
        let err = HomelocConfig::from_toml("/nonexistent/homeloc.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/homeloc.toml"));
    }
}
