//! End-of-run display for the domain-watch CLI.
//!
//! Prints the run tally and the change report. Uses only the `console`
//! crate for styling, which degrades to plain text when stdout is not a
//! terminal.

use console::style;
use domain_watch_lib::{RunSummary, NO_CHANGES};
use std::time::Duration;

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Plain-text pieces of the tally bar, in display order.
fn tally_parts(summary: &RunSummary) -> Vec<String> {
    vec![
        format!("{} not due", summary.not_due),
        format!("{} deferred", summary.deferred),
        format!("{} error{}", summary.errors, plural(summary.errors)),
        format!(
            "{} change{}",
            summary.events.len(),
            plural(summary.events.len())
        ),
    ]
}

// ── Tally ────────────────────────────────────────────────────────────────────

/// Print the one-line tally with colored counts.
pub fn print_tally(summary: &RunSummary, duration: Duration) {
    let parts = tally_parts(summary);
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} checked in {:.1}s  {}  {}  {}  {}  {}  {}  {}  {}",
        style(summary.checked).bold(),
        plural(summary.checked),
        duration.as_secs_f64(),
        style("|").dim(),
        style(&parts[0]).dim(),
        style("|").dim(),
        style(&parts[1]).yellow(),
        style("|").dim(),
        style(&parts[2]).red(),
        style("|").dim(),
        style(&parts[3]).green(),
    );
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Print the change report, headline first.
pub fn print_report(report: &str) {
    if report == NO_CHANGES {
        println!("{}", style(report).dim());
        return;
    }

    let mut lines = report.lines();
    if let Some(headline) = lines.next() {
        println!("{}", style(headline).bold());
    }
    for line in lines {
        if line.ends_with("registered") || line.starts_with("Newly registered") {
            println!("{}", style(line).green());
        } else {
            println!("{}", line);
        }
    }
}
