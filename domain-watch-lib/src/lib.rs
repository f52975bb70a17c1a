//! # Domain Watch Library
//!
//! Keeps a roster of candidate domain names under periodic DNS
//! observation and reports when a name's registration status changes.
//!
//! Each run loads the roster, picks the records that are due (subject to a
//! re-check interval and a per-run ceiling), resolves them one at a time,
//! stamps the results back into the roster and reports every status change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_watch_lib::{DomainWatcher, Reporter, RosterLayout, WatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let layout = RosterLayout::Combined { path: "domains.csv".into() };
//!     let mut records = layout.load()?;
//!
//!     let config = WatchConfig::default();
//!     let reporter = Reporter::new(config.report_style);
//!     let watcher = DomainWatcher::with_system_resolver(config)?;
//!
//!     let now = chrono::Local::now().naive_local();
//!     let summary = watcher.run(&mut records, now, &reporter).await;
//!     layout.save(&records)?;
//!
//!     println!("{}", reporter.summarize(&summary.events));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Roster Store**: CSV roster, or a domain list plus a separate status file
//! - **Scheduling**: Re-check interval with an oldest-first per-run ceiling
//! - **DNS Resolution**: Registered / available classification via the system resolver
//! - **Notifications**: CI annotations, logs and Telegram alerts for new registrations

// Re-export main public API types and functions
pub use checker::DomainWatcher;
pub use config::{
    load_env_config, ConfigManager, EnvConfig, FileConfig, NotifyConfig, ReportConfig,
    ScheduleConfig,
};
pub use error::DomainWatchError;
pub use notify::{
    Notifier, TelegramConfig, TelegramNotifier, TELEGRAM_API_BASE, TELEGRAM_CHAT_ENV,
    TELEGRAM_TOKEN_ENV,
};
pub use protocols::{classify_lookup, DnsResolver, DomainResolver, LookupFailure};
pub use report::{Reporter, NO_CHANGES};
pub use schedule::{CheckPlan, Schedule};
pub use store::{
    format_timestamp, load_roster, parse_timestamp, save_roster, RosterLayout, ROSTER_HEADER,
    TIMESTAMP_FORMAT,
};
pub use types::{ChangeEvent, DomainRecord, DomainStatus, ReportStyle, RunSummary, WatchConfig};
pub use utils::{normalize_domain, validate_domain};

// Internal modules - these are not part of the public API
mod checker;
mod config;
mod error;
mod notify;
mod protocols;
mod report;
mod schedule;
mod store;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainWatchError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
