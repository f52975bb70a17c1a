//! Main watch loop.
//!
//! This module provides the `DomainWatcher` that takes a loaded roster,
//! checks the records that are due, stamps them with the run time and
//! collects the status transitions.

use crate::error::DomainWatchError;
use crate::protocols::{DnsResolver, DomainResolver};
use crate::report::Reporter;
use crate::schedule::Schedule;
use crate::types::{ChangeEvent, DomainRecord, DomainStatus, RunSummary, WatchConfig};
use crate::utils::validate_domain;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

/// Drives one incremental check over a roster.
///
/// Checks run strictly one after another with `config.delay` between
/// them. A failed lookup marks that record `error` and the loop moves on;
/// nothing a single domain does can abort the run.
///
/// # Example
///
/// ```rust,no_run
/// use domain_watch_lib::{DomainWatcher, Reporter, RosterLayout, WatchConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let layout = RosterLayout::Combined { path: "domains.csv".into() };
///     let mut records = layout.load()?;
///
///     let config = WatchConfig::default();
///     let reporter = Reporter::new(config.report_style);
///     let watcher = DomainWatcher::with_system_resolver(config)?;
///
///     let now = chrono::Local::now().naive_local();
///     let summary = watcher.run(&mut records, now, &reporter).await;
///     layout.save(&records)?;
///
///     println!("{}", reporter.summarize(&summary.events));
///     Ok(())
/// }
/// ```
pub struct DomainWatcher<R> {
    resolver: R,
    config: WatchConfig,
}

impl DomainWatcher<DnsResolver> {
    /// Create a watcher backed by the system DNS resolver.
    pub fn with_system_resolver(config: WatchConfig) -> Result<Self, DomainWatchError> {
        Ok(Self::new(DnsResolver::from_system()?, config))
    }
}

impl<R: DomainResolver> DomainWatcher<R> {
    pub fn new(resolver: R, config: WatchConfig) -> Self {
        Self { resolver, config }
    }

    /// Get the configuration for this watcher.
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Resolve one domain into a status.
    ///
    /// Invalid names and lookup failures both yield `DomainStatus::Error`;
    /// the cause is logged.
    pub async fn check_one(&self, domain: &str) -> DomainStatus {
        if let Err(e) = validate_domain(domain) {
            warn!(domain, error = %e, "skipping lookup for invalid domain");
            return DomainStatus::Error;
        }

        match self.resolver.resolve(domain).await {
            Ok(status) => status,
            Err(e) => {
                warn!(domain, error = %e, "lookup failed");
                DomainStatus::Error
            }
        }
    }

    /// Check every due record in `records`, mutating them in place.
    ///
    /// Records keep their roster positions; only the check order follows
    /// the schedule. Checked records get `last_checked = now` and their new
    /// status. Records that are not due, or that fall beyond the per-run
    /// ceiling, are left untouched.
    pub async fn run(
        &self,
        records: &mut [DomainRecord],
        now: NaiveDateTime,
        reporter: &Reporter,
    ) -> RunSummary {
        let plan = Schedule::from_config(&self.config).plan(records, now);

        info!(
            total = records.len(),
            due = plan.due.len(),
            not_due = plan.not_due,
            deferred = plan.deferred.len(),
            "starting watch run"
        );

        let mut summary = RunSummary {
            not_due: plan.not_due,
            deferred: plan.deferred.len(),
            ..RunSummary::default()
        };

        for (position, &index) in plan.due.iter().enumerate() {
            if position > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            let record = &mut records[index];
            let new_status = self.check_one(&record.domain).await;
            let old_status = record.previous_status();

            record.status = Some(new_status.clone());
            record.last_checked = Some(now);
            summary.checked += 1;
            if new_status == DomainStatus::Error {
                summary.errors += 1;
            }

            debug!(domain = %record.domain, status = %new_status, "checked");
            reporter.emit_progress(&record.domain, &new_status);

            if old_status != new_status {
                let event = ChangeEvent {
                    domain: record.domain.clone(),
                    old_status,
                    new_status,
                    checked_at: now,
                };
                reporter.emit_change(&event).await;
                summary.events.push(event);
            }
        }

        if summary.deferred > 0 {
            info!(
                deferred = summary.deferred,
                "per-run ceiling reached, remaining due domains wait for the next run"
            );
        }

        summary
    }
}
