//! Change reporting.
//!
//! Change events are announced as they happen (CI annotation line, log
//! record, chat message for new registrations) and summarized once at the
//! end of the run. Every delivery path is best-effort.

use crate::notify::Notifier;
use crate::store::format_timestamp;
use crate::types::{ChangeEvent, DomainStatus, ReportStyle};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Message used when a run produced no change events.
pub const NO_CHANGES: &str = "No status changes detected.";

/// Formats and delivers change notifications.
#[derive(Clone)]
pub struct Reporter {
    style: ReportStyle,
    console: bool,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Reporter {
    /// Reporter with console output on and no chat sink.
    pub fn new(style: ReportStyle) -> Self {
        Self {
            style,
            console: true,
            notifier: None,
        }
    }

    /// Toggle progress and `::warning::` lines on stdout.
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Attach a chat sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn style(&self) -> ReportStyle {
        self.style
    }

    /// Whether a chat sink is attached.
    pub fn has_notifier(&self) -> bool {
        self.notifier.is_some()
    }

    /// CI annotation line for one event.
    pub fn annotation(event: &ChangeEvent) -> String {
        format!(
            "::warning::Domain {} changed from {} to {}",
            event.domain, event.old_status, event.new_status
        )
    }

    /// Chat text for a domain that became registered.
    pub fn registration_alert(event: &ChangeEvent) -> String {
        format!(
            "Domain {} is now registered (was {}, checked {})",
            event.domain,
            event.old_status,
            format_timestamp(&event.checked_at)
        )
    }

    /// Print the `domain: status` progress line for a finished check.
    pub fn emit_progress(&self, domain: &str, status: &DomainStatus) {
        if self.console {
            println!("{}: {}", domain, status);
        }
    }

    /// Announce one change immediately.
    ///
    /// The chat sink is only used when the new status is `registered`.
    /// Send failures are logged and swallowed.
    pub async fn emit_change(&self, event: &ChangeEvent) {
        if self.console {
            println!("{}", Self::annotation(event));
        }
        warn!(
            domain = %event.domain,
            old = %event.old_status,
            new = %event.new_status,
            "Domain {} changed from {} to {}",
            event.domain,
            event.old_status,
            event.new_status
        );

        if event.became_registered() {
            self.notify(&Self::registration_alert(event)).await;
        }
    }

    /// Log the end-of-run summary and optionally push it to the chat sink.
    pub async fn deliver_summary(&self, summary: &str, push_to_chat: bool) {
        for line in summary.lines() {
            info!("{}", line);
        }
        if push_to_chat {
            self.notify(summary).await;
        }
    }

    async fn notify(&self, text: &str) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.send(text).await {
            warn!(sink = notifier.name(), error = %e, "notification failed");
        }
    }

    /// Render the end-of-run report for `events`.
    pub fn summarize(&self, events: &[ChangeEvent]) -> String {
        if events.is_empty() {
            return NO_CHANGES.to_string();
        }
        match self.style {
            ReportStyle::Full => summarize_full(events),
            ReportStyle::Registered => summarize_registered(events),
        }
    }
}

fn summarize_full(events: &[ChangeEvent]) -> String {
    let mut lines = vec![format!("Status changes detected: {}", events.len())];
    for event in events {
        lines.push(format!(
            "- {}: {} -> {} ({})",
            event.domain,
            event.old_status,
            event.new_status,
            format_timestamp(&event.checked_at)
        ));
    }
    lines.join("\n")
}

fn summarize_registered(events: &[ChangeEvent]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(event.new_status.as_str()).or_default() += 1;
    }

    let mut lines = vec![format!("Status changes detected: {}", events.len())];
    for (status, count) in &counts {
        lines.push(format!("  {}: {}", status, count));
    }

    let registered: Vec<&ChangeEvent> = events.iter().filter(|e| e.became_registered()).collect();
    if registered.is_empty() {
        lines.push("No domains became registered.".to_string());
    } else {
        lines.push(format!("Newly registered domains ({}):", registered.len()));
        for event in registered {
            lines.push(format!("- {}", event.domain));
        }
    }
    lines.join("\n")
}
