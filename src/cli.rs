//! CLI argument parsing for homeloc

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{HomelocConfig, TieBreak};

/// Output format for home assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Input table with an appended home column (default)
    Csv,
    /// Per-user summary for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "homeloc")]
#[command(version)]
#[command(about = "Infer a home zone per user from geotagged activity records", long_about = None)]
pub struct Cli {
    /// Input CSV file with one row per event
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write output here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// TOML configuration file (thresholds, columns, home column)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Records at a zone must exceed this count (default: 10)
    #[arg(long = "min-tweets", value_name = "N", allow_negative_numbers = true)]
    pub min_tweets: Option<i64>,

    /// Distinct dates at a zone must exceed this count (default: 10)
    #[arg(long = "min-days", value_name = "N", allow_negative_numbers = true)]
    pub min_days: Option<i64>,

    /// Distinct hours at a zone must exceed this count, 0..=24 (default: 8)
    #[arg(long = "min-hours", value_name = "N", allow_negative_numbers = true)]
    pub min_hours: Option<i64>,

    /// Policy for zones tied on record count
    #[arg(long = "tie-break", value_enum)]
    pub tie_break: Option<TieBreak>,

    /// User id column (default: u_id)
    #[arg(long = "uid-column", value_name = "NAME")]
    pub uid_column: Option<String>,

    /// Zone id column (default: OBJECTID)
    #[arg(long = "zone-column", value_name = "NAME")]
    pub zone_column: Option<String>,

    /// Date column (default: date)
    #[arg(long = "date-column", value_name = "NAME")]
    pub date_column: Option<String>,

    /// Hour-of-day column (default: hour)
    #[arg(long = "hour-column", value_name = "NAME")]
    pub hour_column: Option<String>,

    /// chrono format of the date column (default: %Y-%m-%d)
    #[arg(long = "date-format", value_name = "FMT")]
    pub date_format: Option<String>,

    /// Name of the appended CSV column (default: home_zone)
    #[arg(long = "home-column", value_name = "NAME")]
    pub home_column: Option<String>,

    /// Print debug logs to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Layer command-line overrides on top of `config`
    pub fn apply_overrides(&self, mut config: HomelocConfig) -> HomelocConfig {
        let thresholds = &mut config.thresholds;
        if let Some(n) = self.min_tweets {
            thresholds.min_tweets = n;
        }
        if let Some(n) = self.min_days {
            thresholds.min_days = n;
        }
        if let Some(n) = self.min_hours {
            thresholds.min_hours = n;
        }
        if let Some(policy) = self.tie_break {
            thresholds.tie_break = policy;
        }

        let columns = &mut config.columns;
        for (value, slot) in [
            (&self.uid_column, &mut columns.user),
            (&self.zone_column, &mut columns.zone),
            (&self.date_column, &mut columns.date),
            (&self.hour_column, &mut columns.hour),
            (&self.date_format, &mut columns.date_format),
            (&self.home_column, &mut config.home_column),
        ] {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }

        config
    }
}
