//! Home location assignment
//!
//! Methodology:
//!
//! 1. Group records by (user, zone). Records without a zone never form a group.
//! 2. Keep groups with more than `min_tweets` records, sent on more than
//!    `min_days` distinct dates and from more than `min_hours` distinct hours
//!    of the day. All three checks use the full group.
//! 3. For each user pick the surviving group with the most records, breaking
//!    ties by [`TieBreak`](crate::config::TieBreak).
//! 4. Label every input record with its user's home, or `None` when the user
//!    has no surviving group.
//!
//! # Example
//! ```
//! use chrono::NaiveDate;
//! use homeloc::assign::assign_home_locations;
//! use homeloc::config::HomeLocationConfig;
//! use homeloc::record::ActivityRow;
//!
//! let config = HomeLocationConfig { min_tweets: 1, min_days: 1, min_hours: 1, ..Default::default() };
//! let rows: Vec<ActivityRow> = (1..=3)
//!     .map(|d| ActivityRow::new("alice", Some("tract-7"), NaiveDate::from_ymd_opt(2020, 5, d).unwrap(), d))
//!     .collect();
//!
//! let homes = assign_home_locations(&rows, &config)?;
//! assert!(homes.iter().all(|h| h.as_deref() == Some("tract-7")));
//! # Ok::<(), homeloc::error::HomeLocationError>(())
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::aggregate::{ActivityTable, UserActivity};
use crate::config::{HomeLocationConfig, Thresholds};
use crate::error::Result;
use crate::record::{check_records, ActivityRecord};

/// Inferred home of one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHome<Z> {
    /// `None` if no zone qualified
    pub home: Option<Z>,
    /// Records of this user in the input, with or without a zone
    pub records: usize,
    pub qualifying_zones: usize,
}

/// Mapping from every user in a dataset to their inferred home
#[derive(Debug, Clone)]
pub struct HomeAssignment<U, Z> {
    homes: HashMap<U, UserHome<Z>>,
}

impl<U: Eq + Hash, Z: Clone> HomeAssignment<U, Z> {
    /// Home zone of `user`, `None` if unknown or not in the dataset
    pub fn home_of(&self, user: &U) -> Option<&Z> {
        self.homes.get(user).and_then(|entry| entry.home.as_ref())
    }

    pub fn get(&self, user: &U) -> Option<&UserHome<Z>> {
        self.homes.get(user)
    }

    pub fn users(&self) -> impl Iterator<Item = &U> {
        self.homes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&U, &UserHome<Z>)> {
        self.homes.iter()
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    /// Users with a known home
    pub fn assigned_count(&self) -> usize {
        self.homes.values().filter(|entry| entry.home.is_some()).count()
    }

    pub fn unknown_count(&self) -> usize {
        self.len() - self.assigned_count()
    }

    /// Label each record with its user's home zone
    ///
    /// The result is positionally aligned with `records`.
    pub fn label<R>(&self, records: &[R]) -> Vec<Option<Z>>
    where
        R: ActivityRecord<User = U, Zone = Z>,
        U: Sync,
        Z: Send + Sync,
    {
        let lookup = |record: &R| record.user_id().and_then(|user| self.home_of(user).cloned());

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            records.par_iter().map(lookup).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            records.iter().map(lookup).collect()
        }
    }
}

fn resolve_user<U: Clone, Z: Ord + Clone>(
    user: &U,
    activity: &UserActivity<'_, Z>,
    thresholds: &Thresholds,
) -> (U, UserHome<Z>) {
    let ranking = activity.rank(thresholds);
    if ranking.tied > 1 {
        trace!(
            tied = ranking.tied,
            policy = ?thresholds.tie_break,
            "zones tied on maximal count"
        );
    }

    (
        user.clone(),
        UserHome {
            home: ranking.home.cloned(),
            records: activity.records,
            qualifying_zones: ranking.qualifying_zones,
        },
    )
}

/// Infer the home zone of every user in `records`
///
/// # Errors
/// [`InvalidConfiguration`](crate::error::HomeLocationError::InvalidConfiguration)
/// for bad thresholds, checked first, then
/// [`InvalidInput`](crate::error::HomeLocationError::InvalidInput) for the
/// first record missing a required field.
pub fn infer_homes<R: ActivityRecord>(
    records: &[R],
    config: &HomeLocationConfig,
) -> Result<HomeAssignment<R::User, R::Zone>> {
    let thresholds = config.validate()?;
    let checked = check_records(records)?;
    let table = ActivityTable::build(&checked);

    debug!(
        records = checked.len(),
        users = table.user_count(),
        groups = table.group_count(),
        "built activity table"
    );

    let users = table.into_users();

    #[cfg(feature = "parallel")]
    let homes: HashMap<R::User, UserHome<R::Zone>> = {
        use rayon::prelude::*;
        users
            .par_iter()
            .map(|(user, activity)| resolve_user(*user, activity, &thresholds))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let homes: HashMap<R::User, UserHome<R::Zone>> = users
        .iter()
        .map(|(user, activity)| resolve_user(*user, activity, &thresholds))
        .collect();

    let assignment = HomeAssignment { homes };
    debug!(
        users = assignment.len(),
        assigned = assignment.assigned_count(),
        "assigned home locations"
    );

    Ok(assignment)
}

/// Assign a home zone to every record
///
/// Returns one entry per input record, in input order; all records of a user
/// carry the same value. Users without a qualifying zone get `None`.
pub fn assign_home_locations<R: ActivityRecord>(
    records: &[R],
    config: &HomeLocationConfig,
) -> Result<Vec<Option<R::Zone>>> {
    Ok(infer_homes(records, config)?.label(records))
}
