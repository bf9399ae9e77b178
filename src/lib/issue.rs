//! Problems met while walking templates
//!
//! None of these interrupt the walk of the other templates, they are
//! returned alongside the results so that the caller can tell the user
//! that some history may be missing.

use std::fmt;

use crate::{date::Date, entry::EntryId, schedule::ScheduleError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// the template was skipped entirely
    Malformed { template: EntryId, reason: ScheduleError },
    /// the walk stopped after `limit` occurrences, the last one on `last`
    Truncated { template: EntryId, last: Date, limit: usize },
    /// more than `limit` occurrences from `from` on are already in the
    /// ledger, nothing was projected
    Exhausted { template: EntryId, from: Date, limit: usize },
}

impl Issue {
    pub fn template(&self) -> &EntryId {
        match self {
            Issue::Malformed { template, .. }
            | Issue::Truncated { template, .. }
            | Issue::Exhausted { template, .. } => template,
        }
    }

    /// What message to show to help fix the issue
    pub fn fix_hint(&self) -> String {
        match self {
            Issue::Malformed { reason, .. } => reason.fix_hint(),
            Issue::Truncated { .. } => {
                "occurrences after the last one listed were not created, run again to continue".to_string()
            }
            Issue::Exhausted { .. } => "raise the walk limit to look further ahead".to_string(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::Malformed { template, reason } => {
                write!(f, "template '{}' was skipped: its schedule {}", template, reason)
            }
            Issue::Truncated { template, last, limit } => write!(
                f,
                "template '{}' has more than {} missing occurrences, stopped at {}",
                template, limit, last
            ),
            Issue::Exhausted { template, from, limit } => write!(
                f,
                "template '{}' has more than {} occurrences already recorded from {}, none projected",
                template, limit, from
            ),
        }
    }
}
