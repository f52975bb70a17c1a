//! Re-check scheduling.
//!
//! Decides which roster records are due this run and in what order they
//! are checked. A record is due when it has never been checked or when at
//! least `recheck_days` whole days have passed since its last check.
//!
//! With a per-run ceiling, due records are serviced stalest first
//! (never-checked records before everything else) so that a roster larger
//! than the ceiling is worked through over successive runs.

use crate::types::{DomainRecord, WatchConfig};
use chrono::NaiveDateTime;

/// Selection policy for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    recheck_days: i64,
    max_checks: Option<usize>,
}

/// Which records a run will check, as indices into the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckPlan {
    /// Records to check, in check order
    pub due: Vec<usize>,

    /// Due records pushed to a later run by the ceiling
    pub deferred: Vec<usize>,

    /// Number of records checked too recently to be due
    pub not_due: usize,
}

impl Schedule {
    pub fn new(recheck_days: i64, max_checks: Option<usize>) -> Self {
        Self {
            recheck_days,
            max_checks,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.recheck_days, config.max_checks)
    }

    /// Whether `record` should be checked at `now`.
    pub fn is_due(&self, record: &DomainRecord, now: NaiveDateTime) -> bool {
        match record.last_checked {
            None => true,
            Some(last) => (now - last).num_days() >= self.recheck_days,
        }
    }

    /// Build the check plan for `records` at `now`.
    ///
    /// Without a ceiling every due record is checked in roster order.
    pub fn plan(&self, records: &[DomainRecord], now: NaiveDateTime) -> CheckPlan {
        let mut due: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.is_due(record, now))
            .map(|(index, _)| index)
            .collect();
        let not_due = records.len() - due.len();

        let deferred = match self.max_checks {
            Some(ceiling) => {
                // Stable: ties keep roster order. `None` sorts before any timestamp.
                due.sort_by_key(|&index| records[index].last_checked);
                if due.len() > ceiling {
                    due.split_off(ceiling)
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        };

        CheckPlan {
            due,
            deferred,
            not_due,
        }
    }
}
