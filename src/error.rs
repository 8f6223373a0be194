//! Error taxonomy for home location inference
//!
//! Both variants are raised eagerly, before any grouping work starts, and the
//! whole computation is aborted with no partial result.

use std::fmt;
use thiserror::Error;

/// Required field of an activity record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    UserId,
    Date,
    Hour,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::UserId => "user_id",
            Field::Date => "date",
            Field::Hour => "hour",
        };
        f.write_str(name)
    }
}

/// What is wrong with a single input record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputProblem {
    #[error("missing required field `{0}`")]
    MissingField(Field),

    #[error("hour {0} is outside 0..=23")]
    HourOutOfRange(u32),
}

/// Errors returned by the home location assigner
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HomeLocationError {
    #[error("Invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfiguration {
        parameter: &'static str,
        value: i64,
        reason: &'static str,
    },

    /// `row` is the zero-based position of the record in the input slice
    #[error("Invalid input at record {row}: {problem}")]
    InvalidInput { row: usize, problem: InputProblem },
}

pub type Result<T> = std::result::Result<T, HomeLocationError>;
