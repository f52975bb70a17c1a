// domain-watch-lib/tests/integration.rs

//! Integration tests for domain-watch-lib: full runs over on-disk rosters
//! with an in-memory resolver.

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeDelta};
use domain_watch_lib::{
    format_timestamp, DomainResolver, DomainStatus, DomainWatchError, DomainWatcher, Reporter,
    ReportStyle, RosterLayout, TelegramConfig, TelegramNotifier, WatchConfig, NO_CHANGES,
};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Resolver answering from a fixed table; unknown names are available.
struct TableResolver(HashMap<&'static str, DomainStatus>);

#[async_trait]
impl DomainResolver for TableResolver {
    async fn resolve(&self, domain: &str) -> Result<DomainStatus, DomainWatchError> {
        if domain == "servfail.example" {
            return Err(DomainWatchError::resolution(domain, "SERVFAIL"));
        }
        Ok(self
            .0
            .get(domain)
            .cloned()
            .unwrap_or(DomainStatus::NotRegistered))
    }
}

fn run_time() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-06-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn quiet_config() -> WatchConfig {
    let mut config = WatchConfig::default().with_delay(Duration::ZERO);
    config.console_output = false;
    config
}

fn watcher() -> DomainWatcher<TableResolver> {
    let table = HashMap::from([
        ("taken.com", DomainStatus::Registered),
        ("exarnple.com", DomainStatus::Registered),
    ]);
    DomainWatcher::new(TableResolver(table), quiet_config())
}

#[tokio::test]
async fn test_combined_roster_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domains.csv");
    let recent = format_timestamp(&(run_time() - TimeDelta::days(2)));
    fs::write(
        &path,
        format!(
            "domain,base_domain,generation_date,last_checked,status\n\
             exarnple.com,example.com,2024-01-01,2024-05-01 08:00:00,available\n\
             free.com,example.com,2024-01-01,,\n\
             taken.com,example.com,2024-01-01,{recent},available\n\
             servfail.example,example.com,2024-01-01,,\n"
        ),
    )
    .unwrap();

    let layout = RosterLayout::Combined { path: path.clone() };
    let mut records = layout.load().unwrap();
    let reporter = Reporter::new(ReportStyle::Full).with_console(false);
    let summary = watcher().run(&mut records, run_time(), &reporter).await;
    layout.save(&records).unwrap();

    assert_eq!(summary.checked, 3);
    assert_eq!(summary.not_due, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.events.len(), 3);

    let reloaded = layout.load().unwrap();
    let by_name: HashMap<_, _> = reloaded.iter().map(|r| (r.domain.as_str(), r)).collect();

    assert_eq!(
        by_name["exarnple.com"].status,
        Some(DomainStatus::Registered)
    );
    assert_eq!(by_name["exarnple.com"].last_checked, Some(run_time()));
    assert_eq!(by_name["free.com"].status, Some(DomainStatus::NotRegistered));
    assert_eq!(by_name["servfail.example"].status, Some(DomainStatus::Error));

    // Not due: untouched, even though the resolver would now say registered
    assert_eq!(by_name["taken.com"].status, Some(DomainStatus::NotRegistered));
    assert_eq!(
        by_name["taken.com"].last_checked,
        Some(run_time() - TimeDelta::days(2))
    );

    // Row order and informational columns survive the rewrite
    let order: Vec<_> = reloaded.iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(
        order,
        ["exarnple.com", "free.com", "taken.com", "servfail.example"]
    );
    assert_eq!(
        by_name["free.com"].base_domain.as_deref(),
        Some("example.com")
    );

    let report = reporter.summarize(&summary.events);
    assert!(report.contains("- exarnple.com: available -> registered (2024-06-15 12:00:00)"));
}

#[tokio::test]
async fn test_second_run_is_quiet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domains.csv");
    fs::write(
        &path,
        "domain,base_domain,generation_date,last_checked,status\nfree.com,,,,\n",
    )
    .unwrap();

    let layout = RosterLayout::Combined { path };
    let reporter = Reporter::new(ReportStyle::Full).with_console(false);

    let mut records = layout.load().unwrap();
    let first = watcher().run(&mut records, run_time(), &reporter).await;
    layout.save(&records).unwrap();
    assert_eq!(first.events.len(), 1);

    // A week later the record is due again but its status is unchanged
    let later = run_time() + TimeDelta::days(7);
    let mut records = layout.load().unwrap();
    let second = watcher().run(&mut records, later, &reporter).await;
    assert_eq!(second.checked, 1);
    assert!(second.events.is_empty());
    assert_eq!(reporter.summarize(&second.events), NO_CHANGES);
}

#[tokio::test]
async fn test_split_layout_with_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    let status = dir.path().join("status.csv");

    fs::write(&input, "Domain,Note\ntaken.com,x\nfree.com,y\n").unwrap();
    fs::write(&status, "Domain,Status\ntaken.com,available\n").unwrap();

    let layout = RosterLayout::Split {
        input,
        output: Some(output.clone()),
        status: status.clone(),
    };
    let mut records = layout.load().unwrap();
    let reporter = Reporter::new(ReportStyle::Registered).with_console(false);
    let summary = watcher().run(&mut records, run_time(), &reporter).await;
    layout.save(&records).unwrap();

    assert_eq!(summary.checked, 2);
    let report = reporter.summarize(&summary.events);
    assert!(report.contains("Newly registered domains (1):\n- taken.com"));

    let status_text = fs::read_to_string(&status).unwrap();
    assert_eq!(
        status_text,
        "Domain,Status,Last_Checked\n\
         taken.com,registered,2024-06-15 12:00:00\n\
         free.com,available,2024-06-15 12:00:00\n"
    );
    let output_text = fs::read_to_string(&output).unwrap();
    assert!(output_text.starts_with("Domain,Status,Check_Time\n"));
    assert!(output_text.contains("taken.com,registered,2024-06-15 12:00:00"));
}

#[tokio::test]
async fn test_unconfigured_chat_sink_does_not_break_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domains.csv");
    fs::write(
        &path,
        "domain,base_domain,generation_date,last_checked,status\ntaken.com,,,,available\n",
    )
    .unwrap();

    let notifier = TelegramNotifier::new(TelegramConfig::default()).unwrap();
    let reporter = Reporter::new(ReportStyle::Full)
        .with_console(false)
        .with_notifier(Arc::new(notifier));

    let layout = RosterLayout::Combined { path };
    let mut records = layout.load().unwrap();
    let summary = watcher().run(&mut records, run_time(), &reporter).await;
    reporter
        .deliver_summary(&reporter.summarize(&summary.events), true)
        .await;
    layout.save(&records).unwrap();

    assert_eq!(summary.events.len(), 1);
    assert!(summary.events[0].became_registered());
    let reloaded = layout.load().unwrap();
    assert_eq!(reloaded[0].status, Some(DomainStatus::Registered));
}

#[test]
fn test_ceiling_defers_newest_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domains.csv");
    fs::write(
        &path,
        "domain,base_domain,generation_date,last_checked,status\n\
         a.com,,,2024-06-01 00:00:00,available\n\
         b.com,,,,\n\
         c.com,,,2024-05-01 00:00:00,available\n",
    )
    .unwrap();

    let layout = RosterLayout::Combined { path };
    let mut records = layout.load().unwrap();
    let config = quiet_config().with_max_checks(2);
    let watcher = DomainWatcher::new(TableResolver(HashMap::new()), config);
    let reporter = Reporter::new(ReportStyle::Full).with_console(false);

    let summary = tokio_test::block_on(watcher.run(&mut records, run_time(), &reporter));

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.deferred, 1);
    // Never-checked first, then the oldest; a.com waits for the next run
    assert_eq!(
        records[0].last_checked,
        NaiveDateTime::parse_from_str("2024-06-01 00:00:00", "%Y-%m-%d %H:%M:%S").ok()
    );
    assert_eq!(records[1].last_checked, Some(run_time()));
    assert_eq!(records[2].last_checked, Some(run_time()));
}
