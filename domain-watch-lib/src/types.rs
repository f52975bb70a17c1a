//! Core data types for watch runs.
//!
//! This module defines the roster record, the status vocabulary, the
//! change events produced by a run, and the tunables that drive one.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Registration status of a domain as stored in the roster.
///
/// Statuses are persisted as free-form text. Parsing is exact: a value
/// spelled differently from the canonical forms (for example `Registered`
/// with a capital letter) is kept verbatim as [`DomainStatus::Other`] and
/// therefore never compares equal to a freshly computed status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainStatus {
    /// Never looked up. Used as the sentinel for records without a status.
    Unchecked,

    /// Name resolved to at least one address
    Registered,

    /// Name does not exist in DNS, so it is presumed available
    NotRegistered,

    /// Lookup failed for a reason other than "name not found"
    Error,

    /// Any other text found in the store
    Other(String),
}

impl DomainStatus {
    /// Canonical text form used when writing the roster.
    pub fn as_str(&self) -> &str {
        match self {
            DomainStatus::Unchecked => "unchecked",
            DomainStatus::Registered => "registered",
            DomainStatus::NotRegistered => "available",
            DomainStatus::Error => "error",
            DomainStatus::Other(text) => text,
        }
    }

    /// Parse a stored status cell. Empty cells mean "no status".
    pub fn parse(text: &str) -> Option<Self> {
        let status = match text {
            "" => return None,
            "unchecked" => DomainStatus::Unchecked,
            "registered" => DomainStatus::Registered,
            "available" => DomainStatus::NotRegistered,
            "error" => DomainStatus::Error,
            other => DomainStatus::Other(other.to_string()),
        };
        Some(status)
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Fully qualified domain name, the roster key
    pub domain: String,

    /// Grouping key, typically the domain the candidate was derived from
    pub base_domain: Option<String>,

    /// When the candidate was generated. Informational only.
    pub generation_date: Option<String>,

    /// Time of the last completed check; `None` means never checked
    pub last_checked: Option<NaiveDateTime>,

    /// Last stored status; `None` means no status has been recorded
    pub status: Option<DomainStatus>,
}

impl DomainRecord {
    /// Create a record that has never been checked.
    pub fn new<D: Into<String>>(domain: D) -> Self {
        Self {
            domain: domain.into(),
            base_domain: None,
            generation_date: None,
            last_checked: None,
            status: None,
        }
    }

    /// Attach a stored status and check time.
    pub fn with_state(mut self, status: DomainStatus, last_checked: NaiveDateTime) -> Self {
        self.status = Some(status);
        self.last_checked = Some(last_checked);
        self
    }

    /// Status to compare against, falling back to the `unchecked` sentinel.
    pub fn previous_status(&self) -> DomainStatus {
        self.status.clone().unwrap_or(DomainStatus::Unchecked)
    }
}

/// A status transition observed during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub domain: String,
    pub old_status: DomainStatus,
    pub new_status: DomainStatus,
    pub checked_at: NaiveDateTime,
}

impl ChangeEvent {
    /// True when this transition ends in `registered`.
    pub fn became_registered(&self) -> bool {
        self.new_status == DomainStatus::Registered
    }
}

/// Outcome counters and change events for one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Records that were resolved this run
    pub checked: usize,

    /// Records skipped because they were checked recently
    pub not_due: usize,

    /// Due records left for a later run because the ceiling was reached
    pub deferred: usize,

    /// Checks that ended with an `error` status
    pub errors: usize,

    /// Status transitions, in check order
    pub events: Vec<ChangeEvent>,
}

/// Layout of the change report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// One line per change event
    #[default]
    Full,

    /// Counts per new status plus the list of newly registered domains
    Registered,
}

impl FromStr for ReportStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ReportStyle::Full),
            "registered" => Ok(ReportStyle::Registered),
            other => Err(format!(
                "Unknown report style '{}', expected 'full' or 'registered'",
                other
            )),
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStyle::Full => write!(f, "full"),
            ReportStyle::Registered => write!(f, "registered"),
        }
    }
}

/// Tunables for one watch run.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    /// Days that must pass before a record is checked again.
    /// Default: 7
    pub recheck_days: i64,

    /// Maximum number of lookups in a single run; `None` disables the cap.
    /// Default: 1000
    pub max_checks: Option<usize>,

    /// Pause between consecutive lookups.
    /// Default: 1 second
    pub delay: Duration,

    /// How the end-of-run report is laid out.
    /// Default: full
    pub report_style: ReportStyle,

    /// Also push the end-of-run report to the chat sink.
    /// Default: false
    pub notify_summary: bool,

    /// Print per-domain progress and `::warning::` annotation lines.
    /// Default: true
    pub console_output: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            recheck_days: 7,
            max_checks: Some(1000),
            delay: Duration::from_secs(1),
            report_style: ReportStyle::Full,
            notify_summary: false,
            console_output: true,
        }
    }
}

impl WatchConfig {
    /// Set the re-check interval in days (at least one).
    pub fn with_recheck_days(mut self, days: i64) -> Self {
        self.recheck_days = days.max(1);
        self
    }

    /// Set the per-run ceiling. Zero disables it.
    pub fn with_max_checks(mut self, max_checks: usize) -> Self {
        self.max_checks = if max_checks == 0 {
            None
        } else {
            Some(max_checks)
        };
        self
    }

    /// Set the pause between lookups.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the report layout.
    pub fn with_report_style(mut self, style: ReportStyle) -> Self {
        self.report_style = style;
        self
    }
}
