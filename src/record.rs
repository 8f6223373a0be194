//! Activity records consumed by the home location assigner

use chrono::NaiveDate;
use std::hash::Hash;

use crate::error::{Field, HomeLocationError, InputProblem, Result};

/// A single geotagged event (e.g. a tweet) attributed to a user
///
/// Accessors return `Option` so that callers can hand over records straight
/// from a loosely typed source; missing `user_id`, `date` or `hour` values are
/// reported as [`HomeLocationError::InvalidInput`]. A missing `zone_id` is
/// legal and simply means the event never counts toward any zone.
pub trait ActivityRecord: Sync {
    /// Opaque user identifier
    type User: Eq + Hash + Clone + Send + Sync;
    /// Opaque zone identifier (census tract, FIPS code, ...)
    ///
    /// `Ord` drives the default tie-break between equally ranked zones.
    type Zone: Eq + Hash + Ord + Clone + Send + Sync;

    fn user_id(&self) -> Option<&Self::User>;
    fn zone_id(&self) -> Option<&Self::Zone>;
    fn date(&self) -> Option<NaiveDate>;
    /// Hour of day, 0..=23
    fn hour(&self) -> Option<u32>;
}

/// Owned activity row with string identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub user_id: Option<String>,
    pub zone_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub hour: Option<u32>,
}

impl ActivityRow {
    /// Create a fully populated row
    pub fn new(
        user_id: impl Into<String>,
        zone_id: Option<&str>,
        date: NaiveDate,
        hour: u32,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            zone_id: zone_id.map(str::to_string),
            date: Some(date),
            hour: Some(hour),
        }
    }
}

impl ActivityRecord for ActivityRow {
    type User = String;
    type Zone = String;

    fn user_id(&self) -> Option<&String> {
        self.user_id.as_ref()
    }

    fn zone_id(&self) -> Option<&String> {
        self.zone_id.as_ref()
    }

    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn hour(&self) -> Option<u32> {
        self.hour
    }
}

/// Fully validated view of a record: every required field is present
#[derive(Debug, Clone, Copy)]
pub(crate) struct CheckedRecord<'a, U, Z> {
    pub user: &'a U,
    pub zone: Option<&'a Z>,
    pub date: NaiveDate,
    pub hour: u32,
}

/// Check every record up front and return borrowed, fully populated views
///
/// Fails on the first record that is missing a required field or carries an
/// hour outside 0..=23.
pub(crate) fn check_records<R: ActivityRecord>(
    records: &[R],
) -> Result<Vec<CheckedRecord<'_, R::User, R::Zone>>> {
    records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let invalid = |problem| HomeLocationError::InvalidInput { row, problem };

            let user = record
                .user_id()
                .ok_or_else(|| invalid(InputProblem::MissingField(Field::UserId)))?;
            let date = record
                .date()
                .ok_or_else(|| invalid(InputProblem::MissingField(Field::Date)))?;
            let hour = record
                .hour()
                .ok_or_else(|| invalid(InputProblem::MissingField(Field::Hour)))?;
            if hour > 23 {
                return Err(invalid(InputProblem::HourOutOfRange(hour)));
            }

            Ok(CheckedRecord {
                user,
                zone: record.zone_id(),
                date,
                hour,
            })
        })
        .collect()
}
