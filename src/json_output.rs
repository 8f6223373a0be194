//! JSON summary of home assignments, one entry per user

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;

use crate::assign::HomeAssignment;
use crate::config::HomeLocationConfig;

/// One user's inferred home
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonUserHome {
    pub user_id: String,
    /// `null` when no zone qualified
    pub home_zone: Option<String>,
    pub records: usize,
    pub qualifying_zones: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonTotals {
    pub users: usize,
    pub assigned: usize,
    pub unknown: usize,
    pub records: usize,
}

/// Complete JSON output document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonHomeSummary {
    pub config: HomeLocationConfig,
    /// Sorted by `user_id`
    pub users: Vec<JsonUserHome>,
    pub totals: JsonTotals,
}

impl JsonHomeSummary {
    pub fn from_assignment<U, Z>(assignment: &HomeAssignment<U, Z>, config: &HomeLocationConfig) -> Self
    where
        U: Eq + Hash + Display,
        Z: Clone + Display,
    {
        let mut users: Vec<JsonUserHome> = assignment
            .iter()
            .map(|(user, entry)| JsonUserHome {
                user_id: user.to_string(),
                home_zone: entry.home.as_ref().map(ToString::to_string),
                records: entry.records,
                qualifying_zones: entry.qualifying_zones,
            })
            .collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let totals = JsonTotals {
            users: assignment.len(),
            assigned: assignment.assigned_count(),
            unknown: assignment.unknown_count(),
            records: users.iter().map(|u| u.records).sum(),
        };

        Self {
            config: *config,
            users,
            totals,
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
