//! CSV-backed roster storage.
//!
//! Two on-disk layouts are supported:
//!
//! - **Combined**: one file with the header
//!   `domain,base_domain,generation_date,last_checked,status`. It must exist.
//! - **Split**: a roster file whose first column is the domain, a status
//!   file with `Domain,Status[,Last_Checked]`, and optionally an output file
//!   with `Domain,Status,Check_Time`. Missing split files are read as empty.
//!
//! Saving always rewrites whole files. There is no temp-file swap, so a
//! crash mid-save can leave a truncated file behind.

use crate::error::DomainWatchError;
use crate::types::{DomainRecord, DomainStatus};
use crate::utils::normalize_domain;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Timestamp format used in every file this crate writes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header of the combined roster file.
pub const ROSTER_HEADER: [&str; 5] = [
    "domain",
    "base_domain",
    "generation_date",
    "last_checked",
    "status",
];

const STATUS_HEADER: [&str; 3] = ["Domain", "Status", "Last_Checked"];
const OUTPUT_HEADER: [&str; 3] = ["Domain", "Status", "Check_Time"];

/// Where a roster lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterLayout {
    /// Single file holding domains and their state
    Combined { path: PathBuf },

    /// Domain list plus a separate status file, and an optional report file
    Split {
        input: PathBuf,
        output: Option<PathBuf>,
        status: PathBuf,
    },
}

impl RosterLayout {
    /// Load every record in file order.
    pub fn load(&self) -> Result<Vec<DomainRecord>, DomainWatchError> {
        match self {
            RosterLayout::Combined { path } => load_roster(path),
            RosterLayout::Split { input, status, .. } => {
                let domains = load_domain_list(input)?;
                let previous = load_status_file(status)?;
                Ok(domains
                    .into_iter()
                    .map(|domain| {
                        let mut record = DomainRecord::new(domain);
                        if let Some(state) = previous.get(&record.domain) {
                            record.status = state.status.clone();
                            record.last_checked = state.last_checked;
                        }
                        record
                    })
                    .collect())
            }
        }
    }

    /// Rewrite the backing files from `records`.
    pub fn save(&self, records: &[DomainRecord]) -> Result<(), DomainWatchError> {
        match self {
            RosterLayout::Combined { path } => save_roster(path, records),
            RosterLayout::Split { output, status, .. } => {
                if let Some(output) = output {
                    save_check_output(output, records)?;
                }
                save_status_file(status, records)
            }
        }
    }

    /// File that holds the persisted state, for log messages.
    pub fn state_path(&self) -> &Path {
        match self {
            RosterLayout::Combined { path } => path,
            RosterLayout::Split { status, .. } => status,
        }
    }
}

/// One row of the combined roster file.
#[derive(Debug, Serialize, Deserialize)]
struct RosterRow {
    domain: String,
    #[serde(default)]
    base_domain: Option<String>,
    #[serde(default)]
    generation_date: Option<String>,
    #[serde(default)]
    last_checked: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl From<&DomainRecord> for RosterRow {
    fn from(record: &DomainRecord) -> Self {
        Self {
            domain: record.domain.clone(),
            base_domain: record.base_domain.clone(),
            generation_date: record.generation_date.clone(),
            last_checked: record.last_checked.as_ref().map(format_timestamp),
            status: record.status.as_ref().map(|s| s.as_str().to_string()),
        }
    }
}

/// Persisted state of one domain in a split status file.
#[derive(Debug, Clone, Default)]
struct StoredState {
    status: Option<DomainStatus>,
    last_checked: Option<NaiveDateTime>,
}

/// Parse a stored timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (optionally with fractional seconds),
/// the ISO `T` separator, and a bare date (read as midnight).
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in [
        TIMESTAMP_FORMAT,
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Format a timestamp the way it is stored.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> DomainWatchError + '_ {
    move |e| DomainWatchError::store(display(path), e.to_string())
}

fn open_reader(path: &Path, has_headers: bool) -> Result<csv::Reader<File>, DomainWatchError> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error(path))
}

fn open_writer(path: &Path) -> Result<csv::Writer<File>, DomainWatchError> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error(path))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Load the combined roster file.
///
/// The file must exist and start with [`ROSTER_HEADER`]. Rows with a blank
/// domain are skipped. Unparseable timestamps are treated as "never checked".
pub fn load_roster(path: &Path) -> Result<Vec<DomainRecord>, DomainWatchError> {
    if !path.exists() {
        return Err(DomainWatchError::store(
            display(path),
            "Roster file not found",
        ));
    }

    // Short rows leave trailing columns empty; cells other than the
    // domain are kept verbatim so free-form statuses survive a round trip.
    let mut reader = open_reader(path, true)?;

    let headers = reader.headers().map_err(csv_error(path))?.clone();
    if headers.iter().ne(ROSTER_HEADER.iter().copied()) {
        return Err(DomainWatchError::store(
            display(path),
            format!(
                "Unexpected header '{}', expected '{}'",
                headers.iter().collect::<Vec<_>>().join(","),
                ROSTER_HEADER.join(",")
            ),
        ));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<RosterRow>().enumerate() {
        let row = row.map_err(csv_error(path))?;
        let domain = normalize_domain(&row.domain);
        if domain.is_empty() {
            warn!(path = %path.display(), row = index + 2, "skipping row with blank domain");
            continue;
        }

        let last_checked = match non_empty(row.last_checked) {
            Some(text) => {
                let parsed = parse_timestamp(&text);
                if parsed.is_none() {
                    warn!(%domain, value = %text, "unparseable last_checked, treating as never checked");
                }
                parsed
            }
            None => None,
        };

        records.push(DomainRecord {
            domain,
            base_domain: non_empty(row.base_domain),
            generation_date: non_empty(row.generation_date),
            last_checked,
            status: row.status.as_deref().and_then(DomainStatus::parse),
        });
    }

    debug!(path = %path.display(), count = records.len(), "loaded roster");
    Ok(records)
}

/// Rewrite the combined roster file with a header and every record.
pub fn save_roster(path: &Path, records: &[DomainRecord]) -> Result<(), DomainWatchError> {
    let mut writer = open_writer(path)?;
    writer
        .write_record(ROSTER_HEADER)
        .map_err(csv_error(path))?;
    for record in records {
        writer
            .serialize(RosterRow::from(record))
            .map_err(csv_error(path))?;
    }
    writer
        .flush()
        .map_err(|e| DomainWatchError::store(display(path), e.to_string()))?;

    debug!(path = %path.display(), count = records.len(), "saved roster");
    Ok(())
}

/// Read the domain column of a split roster file.
///
/// The first row is a header and is skipped. A missing file is an empty roster.
fn load_domain_list(path: &Path) -> Result<Vec<String>, DomainWatchError> {
    if !path.exists() {
        warn!(path = %path.display(), "roster file not found, treating as empty");
        return Ok(Vec::new());
    }

    let mut reader = open_reader(path, true)?;
    let mut domains = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error(path))?;
        let domain = row.get(0).map(normalize_domain).unwrap_or_default();
        if domain.is_empty() {
            continue;
        }
        domains.push(domain);
    }
    Ok(domains)
}

/// Read a split status file into a map keyed by domain.
///
/// A missing file means no prior state. `Last_Checked` is optional.
fn load_status_file(path: &Path) -> Result<HashMap<String, StoredState>, DomainWatchError> {
    let mut states = HashMap::new();
    if !path.exists() {
        debug!(path = %path.display(), "no status file yet");
        return Ok(states);
    }

    let mut reader = open_reader(path, true)?;
    let headers = reader.headers().map_err(csv_error(path))?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let (domain_col, status_col) = match (column("Domain"), column("Status")) {
        (Some(d), Some(s)) => (d, s),
        _ => {
            return Err(DomainWatchError::store(
                display(path),
                "Status file must have 'Domain' and 'Status' columns",
            ))
        }
    };
    let checked_col = column("Last_Checked");

    for row in reader.records() {
        let row = row.map_err(csv_error(path))?;
        let domain = row.get(domain_col).map(normalize_domain).unwrap_or_default();
        if domain.is_empty() {
            continue;
        }
        let state = StoredState {
            status: row.get(status_col).and_then(DomainStatus::parse),
            last_checked: checked_col
                .and_then(|col| row.get(col))
                .and_then(parse_timestamp),
        };
        states.insert(domain, state);
    }

    Ok(states)
}

fn save_status_file(path: &Path, records: &[DomainRecord]) -> Result<(), DomainWatchError> {
    let mut writer = open_writer(path)?;
    writer
        .write_record(STATUS_HEADER)
        .map_err(csv_error(path))?;
    for record in records {
        let status = record.status.as_ref().map(|s| s.as_str()).unwrap_or("");
        let checked = record
            .last_checked
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default();
        writer
            .write_record([record.domain.as_str(), status, checked.as_str()])
            .map_err(csv_error(path))?;
    }
    writer
        .flush()
        .map_err(|e| DomainWatchError::store(display(path), e.to_string()))
}

fn save_check_output(path: &Path, records: &[DomainRecord]) -> Result<(), DomainWatchError> {
    let mut writer = open_writer(path)?;
    writer
        .write_record(OUTPUT_HEADER)
        .map_err(csv_error(path))?;
    for record in records {
        let status = record.previous_status();
        let checked = record
            .last_checked
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default();
        writer
            .write_record([record.domain.as_str(), status.as_str(), checked.as_str()])
            .map_err(csv_error(path))?;
    }
    writer
        .flush()
        .map_err(|e| DomainWatchError::store(display(path), e.to_string()))
}
