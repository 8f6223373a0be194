//! Per-(user, zone) activity aggregation
//!
//! A single traversal of the input builds one [`ZoneActivity`] counter per
//! (user, zone) pair. Qualification and ranking then run over this table
//! without touching the records again.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::config::{Thresholds, TieBreak};
use crate::record::CheckedRecord;

/// Set of hours of the day, stored as a 24-bit mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourSet(u32);

impl HourSet {
    /// Insert an hour (0..=23)
    pub fn insert(&mut self, hour: u32) {
        debug_assert!(hour < 24);
        self.0 |= 1 << hour;
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour < 24 && self.0 & (1 << hour) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Aggregate counters for one (user, zone) group
#[derive(Debug, Clone)]
pub struct ZoneActivity {
    count: usize,
    days: HashSet<NaiveDate>,
    hours: HourSet,
    first_seen: usize,
}

impl ZoneActivity {
    fn new(first_seen: usize) -> Self {
        Self {
            count: 0,
            days: HashSet::new(),
            hours: HourSet::default(),
            first_seen,
        }
    }

    fn record(&mut self, date: NaiveDate, hour: u32) {
        self.count += 1;
        self.days.insert(date);
        self.hours.insert(hour);
    }

    /// Number of records in the group
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn distinct_days(&self) -> usize {
        self.days.len()
    }

    pub fn distinct_hours(&self) -> usize {
        self.hours.len()
    }

    /// Input position of the first record of this group
    pub fn first_seen(&self) -> usize {
        self.first_seen
    }

    /// True if the group passes the volume, day and hour filters
    pub fn qualifies(&self, thresholds: &Thresholds) -> bool {
        self.count > thresholds.min_tweets
            && self.distinct_days() > thresholds.min_days
            && self.distinct_hours() > thresholds.min_hours
    }
}

/// All zone groups of one user
#[derive(Debug, Clone)]
pub struct UserActivity<'a, Z> {
    /// Total records of the user, including those without a zone
    pub records: usize,
    pub zones: HashMap<&'a Z, ZoneActivity>,
}

impl<'a, Z> Default for UserActivity<'a, Z> {
    fn default() -> Self {
        Self {
            records: 0,
            zones: HashMap::new(),
        }
    }
}

/// Outcome of ranking one user's zones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking<'a, Z> {
    pub home: Option<&'a Z>,
    pub qualifying_zones: usize,
    /// Zones sharing the winning count (1 when there is no tie)
    pub tied: usize,
}

impl<'a, Z: Ord> UserActivity<'a, Z> {
    /// Pick the qualifying zone with the most records
    ///
    /// Ties on count are resolved by `thresholds.tie_break`.
    pub fn rank(&self, thresholds: &Thresholds) -> Ranking<'a, Z> {
        let qualified: Vec<(&'a Z, &ZoneActivity)> = self
            .zones
            .iter()
            .filter(|(_, activity)| activity.qualifies(thresholds))
            .map(|(zone, activity)| (*zone, activity))
            .collect();

        let best = qualified.iter().copied().max_by(|(za, a), (zb, b)| {
            a.count.cmp(&b.count).then_with(|| match thresholds.tie_break {
                // max_by keeps the greater element, so invert the secondary key
                TieBreak::SmallestZone => zb.cmp(za),
                TieBreak::FirstSeen => b.first_seen.cmp(&a.first_seen),
            })
        });

        let tied = best.map_or(0, |(_, top)| {
            qualified
                .iter()
                .filter(|(_, activity)| activity.count == top.count)
                .count()
        });

        Ranking {
            home: best.map(|(zone, _)| zone),
            qualifying_zones: qualified.len(),
            tied,
        }
    }
}

/// Activity counters for every user in a dataset
#[derive(Debug, Clone)]
pub struct ActivityTable<'a, U, Z> {
    users: HashMap<&'a U, UserActivity<'a, Z>>,
}

impl<'a, U: Eq + Hash, Z: Eq + Hash> ActivityTable<'a, U, Z> {
    /// Build the table in one pass over validated records
    ///
    /// Records without a zone count toward the user's total but never form
    /// a zone group.
    pub(crate) fn build(records: &[CheckedRecord<'a, U, Z>]) -> Self {
        let mut users: HashMap<&'a U, UserActivity<'a, Z>> = HashMap::new();

        for (row, record) in records.iter().enumerate() {
            let user = users.entry(record.user).or_default();
            user.records += 1;

            if let Some(zone) = record.zone {
                user.zones
                    .entry(zone)
                    .or_insert_with(|| ZoneActivity::new(row))
                    .record(record.date, record.hour);
            }
        }

        Self { users }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of (user, zone) groups
    pub fn group_count(&self) -> usize {
        self.users.values().map(|user| user.zones.len()).sum()
    }

    pub fn get(&self, user: &U) -> Option<&UserActivity<'a, Z>> {
        self.users.get(user)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a U, &UserActivity<'a, Z>)> + '_ {
        self.users.iter().map(|(user, activity)| (*user, activity))
    }

    pub(crate) fn into_users(self) -> HashMap<&'a U, UserActivity<'a, Z>> {
        self.users
    }
}
