//! homeloc - Home location inference for geotagged activity data
//!
//! Assigns each user a home zone (census tract, FIPS code, ...) from their
//! geotagged events: a zone qualifies when the user was active there often
//! enough, on enough distinct days and at enough distinct hours of the day,
//! and the qualifying zone with the most events wins.
//!
//! The core is [`assign::assign_home_locations`]; the CSV, JSON and CLI
//! modules are thin adapters around it.

pub mod aggregate;
pub mod assign;
pub mod cli;
pub mod config;
pub mod csv_input;
pub mod csv_output;
pub mod error;
pub mod json_output;
pub mod record;

pub use assign::{assign_home_locations, infer_homes, HomeAssignment, UserHome};
pub use config::{ColumnMapping, HomeLocationConfig, HomelocConfig, TieBreak};
pub use error::HomeLocationError;
pub use record::{ActivityRecord, ActivityRow};
