//! Domain Watch CLI Application
//!
//! Runs one incremental check over a domain roster: loads it, resolves the
//! records that are due, writes the results back and reports every status
//! change. Intended to run on a schedule (cron, CI).

mod logging;
mod ui;

use anyhow::{anyhow, Context, Result};
use chrono::SubsecRound;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_watch_lib::{load_env_config, ConfigManager, FileConfig};
use domain_watch_lib::{
    DomainWatchError, DomainWatcher, ReportStyle, Reporter, RosterLayout, RunSummary, TelegramConfig,
    TelegramNotifier, WatchConfig,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Level};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

const USAGE: &str =
    "Usage: domain-watch <domains_file> | <input> <status> | <input> <output> <status>";

/// CLI arguments for domain-watch
#[derive(Parser, Debug)]
#[command(name = "domain-watch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Watch a roster of domains for DNS registration changes")]
#[command(
    long_about = "Watch a roster of domains for DNS registration changes.\n\nPass one combined roster file, an input list plus a status file, or an input list, an output file and a status file. Domains are re-checked once their last check is older than the re-check interval."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Roster file, or INPUT STATUS, or INPUT OUTPUT STATUS
    #[arg(value_name = "FILES", help_heading = "Roster")]
    pub files: Vec<PathBuf>,

    /// Days before a domain is checked again (default: 7)
    #[arg(
        long = "recheck-days",
        value_name = "DAYS",
        value_parser = clap::value_parser!(i64).range(1..),
        help_heading = "Schedule"
    )]
    pub recheck_days: Option<i64>,

    /// Maximum lookups per run, 0 for no limit (default: 1000)
    #[arg(long = "max-checks", value_name = "N", help_heading = "Schedule")]
    pub max_checks: Option<usize>,

    /// Pause between lookups in milliseconds (default: 1000)
    #[arg(long = "delay-ms", value_name = "MS", help_heading = "Schedule")]
    pub delay_ms: Option<u64>,

    /// Report layout: full or registered
    #[arg(long = "report-style", value_name = "STYLE", help_heading = "Reporting")]
    pub report_style: Option<ReportStyle>,

    /// Also send the end-of-run report to Telegram
    #[arg(long = "notify-summary", help_heading = "Reporting")]
    pub notify_summary: bool,

    /// Do not print per-domain progress and ::warning:: lines
    #[arg(long = "no-console-markers", help_heading = "Reporting")]
    pub no_console_markers: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Log file, opened in append mode
    #[arg(
        long = "log-file",
        value_name = "FILE",
        default_value = "domain_watch.log",
        help_heading = "Configuration"
    )]
    pub log_file: PathBuf,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(usage) = validate_args(&args) {
        println!("{}", usage);
        process::exit(1);
    }

    if let Err(e) = logging::init(&args.log_file, args.verbose) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    // Run the watch
    if let Err(e) = run_watch(args).await {
        if failure_level(&e) == Level::WARN {
            warn!("Run stopped: {:#}", e);
        } else {
            error!("Critical error: {:#}", e);
        }
        process::exit(1);
    }
}

/// Log level for an error that ended the run.
///
/// Library errors that are not fatal on their own (per-domain or chat
/// failures) are reported as warnings; everything else is critical.
fn failure_level(err: &anyhow::Error) -> Level {
    match err.downcast_ref::<DomainWatchError>() {
        Some(inner) if !inner.is_fatal() => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Attach the chat sink to `reporter`.
///
/// A sink that cannot be built only disables chat alerts.
fn attach_notifier(
    reporter: Reporter,
    notifier: Result<TelegramNotifier, DomainWatchError>,
) -> Result<Reporter> {
    match notifier {
        Ok(notifier) => {
            if !notifier.config().is_complete() {
                debug!("Telegram credentials not set, chat alerts will be skipped with a warning");
            }
            Ok(reporter.with_notifier(Arc::new(notifier)))
        }
        Err(e) if e.is_notification() => {
            warn!("Chat alerts disabled: {}", e);
            Ok(reporter)
        }
        Err(e) => Err(e.into()),
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), &'static str> {
    match args.files.len() {
        1..=3 => Ok(()),
        _ => Err(USAGE),
    }
}

/// Map positional file arguments onto a roster layout.
fn build_layout(files: &[PathBuf]) -> Option<RosterLayout> {
    match files {
        [path] => Some(RosterLayout::Combined { path: path.clone() }),
        [input, status] => Some(RosterLayout::Split {
            input: input.clone(),
            output: None,
            status: status.clone(),
        }),
        [input, output, status] => Some(RosterLayout::Split {
            input: input.clone(),
            output: Some(output.clone()),
            status: status.clone(),
        }),
        _ => None,
    }
}

async fn run_watch(args: Args) -> Result<()> {
    let layout = build_layout(&args.files).ok_or_else(|| anyhow!(USAGE))?;
    let (config, telegram) = build_config(&args)?;

    info!(
        "Domain Watch v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        layout.state_path().display()
    );
    debug!(?config, ?telegram, "effective configuration");

    let mut records = layout.load().context("Failed to load roster")?;
    info!("Loaded {} domains", records.len());

    let reporter = attach_notifier(
        Reporter::new(config.report_style).with_console(config.console_output),
        TelegramNotifier::new(telegram),
    )?;
    let notify_summary = config.notify_summary;

    let now = chrono::Local::now().naive_local().trunc_subsecs(0);
    let started = Instant::now();
    let summary = if records.is_empty() {
        info!("Roster is empty, nothing to check");
        RunSummary::default()
    } else {
        let watcher = DomainWatcher::with_system_resolver(config)?;
        watcher.run(&mut records, now, &reporter).await
    };

    layout.save(&records).context("Failed to save results")?;

    let report = reporter.summarize(&summary.events);
    ui::print_tally(&summary, started.elapsed());
    ui::print_report(&report);
    reporter.deliver_summary(&report, notify_summary).await;

    Ok(())
}

/// Resolve the effective configuration.
///
/// Precedence, lowest to highest: defaults, config file, `DW_*`
/// environment variables, CLI flags.
fn build_config(args: &Args) -> Result<(WatchConfig, TelegramConfig)> {
    let config_manager = ConfigManager::new(args.verbose);

    // Step 1: config file (explicit path, DW_CONFIG, or discovery)
    let explicit = args
        .config
        .clone()
        .or_else(|| std::env::var_os("DW_CONFIG").map(PathBuf::from));
    let file_config: FileConfig = match explicit {
        Some(path) => {
            debug!("Using explicit config file: {}", path.display());
            config_manager
                .load_file(&path)
                .with_context(|| format!("Failed to load config file '{}'", path.display()))?
        }
        None => config_manager.discover_and_load(),
    };
    let config = file_config.apply_to(WatchConfig::default())?;

    // Step 2: environment variables (DW_*)
    let config = load_env_config().apply_to(config);

    // Step 3: CLI arguments (highest precedence)
    let config = apply_cli_args_to_config(config, args);

    let telegram = file_config.apply_to_telegram(TelegramConfig::from_env());
    Ok((config, telegram))
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(mut config: WatchConfig, args: &Args) -> WatchConfig {
    if let Some(days) = args.recheck_days {
        config = config.with_recheck_days(days);
    }
    if let Some(max_checks) = args.max_checks {
        config = config.with_max_checks(max_checks);
    }
    if let Some(delay_ms) = args.delay_ms {
        config = config.with_delay(Duration::from_millis(delay_ms));
    }
    if let Some(style) = args.report_style {
        config = config.with_report_style(style);
    }

    // Flags only ever switch behavior on; absent flags keep file/env values
    if args.notify_summary {
        config.notify_summary = true;
    }
    if args.no_console_markers {
        config.console_output = false;
    }
    config
}
