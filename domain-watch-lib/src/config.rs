//! Configuration file parsing and management.
//!
//! Settings are layered with increasing precedence: built-in defaults,
//! TOML configuration file, `DW_*` environment variables, CLI flags. This
//! module handles the first three; the CLI applies its flags last.

use crate::error::DomainWatchError;
use crate::notify::TelegramConfig;
use crate::types::{ReportStyle, WatchConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Re-check interval, ceiling and pacing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleConfig>,

    /// End-of-run report settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,

    /// Chat sink settings (credentials stay in the environment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScheduleConfig {
    /// Days between checks of the same domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recheck_days: Option<i64>,

    /// Per-run ceiling; 0 disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_checks: Option<usize>,

    /// Pause between lookups in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReportConfig {
    /// "full" or "registered"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Push the summary to the chat sink as well
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_summary: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NotifyConfig {
    /// Bot API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_api: Option<String>,
}

impl FileConfig {
    /// Overlay the file's settings on `config`.
    pub fn apply_to(&self, mut config: WatchConfig) -> Result<WatchConfig, DomainWatchError> {
        if let Some(schedule) = &self.schedule {
            if let Some(days) = schedule.recheck_days {
                config = config.with_recheck_days(days);
            }
            if let Some(max_checks) = schedule.max_checks {
                config = config.with_max_checks(max_checks);
            }
            if let Some(delay_ms) = schedule.delay_ms {
                config = config.with_delay(Duration::from_millis(delay_ms));
            }
        }

        if let Some(report) = &self.report {
            if let Some(style) = &report.style {
                let style = style
                    .parse::<ReportStyle>()
                    .map_err(DomainWatchError::config)?;
                config = config.with_report_style(style);
            }
            if let Some(notify_summary) = report.notify_summary {
                config.notify_summary = notify_summary;
            }
        }

        Ok(config)
    }

    /// Overlay the file's sink settings on `telegram`.
    pub fn apply_to_telegram(&self, telegram: TelegramConfig) -> TelegramConfig {
        match self.notify.as_ref().and_then(|n| n.telegram_api.clone()) {
            Some(api) => telegram.with_api_base(api),
            None => telegram,
        }
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainWatchError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainWatchError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainWatchError::config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        if self.verbose {
            debug!(path = %path.display(), "loaded configuration file");
        }
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// The XDG config is loaded first and a local file in the working
    /// directory overrides it field by field. Unreadable files are skipped
    /// with a warning.
    pub fn discover_and_load(&self) -> FileConfig {
        let mut merged = FileConfig::default();

        for path in [self.get_xdg_config_path(), self.get_local_config_path()]
            .into_iter()
            .flatten()
        {
            match self.load_file(&path) {
                Ok(config) => merged = self.merge_configs(merged, config),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring configuration file"),
            }
        }

        merged
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./domain-watch.toml", "./.domain-watch.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-watch").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations. Values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            schedule: match (lower.schedule, higher.schedule) {
                (Some(lower), Some(higher)) => Some(ScheduleConfig {
                    recheck_days: higher.recheck_days.or(lower.recheck_days),
                    max_checks: higher.max_checks.or(lower.max_checks),
                    delay_ms: higher.delay_ms.or(lower.delay_ms),
                }),
                (lower, higher) => higher.or(lower),
            },
            report: match (lower.report, higher.report) {
                (Some(lower), Some(higher)) => Some(ReportConfig {
                    style: higher.style.or(lower.style),
                    notify_summary: higher.notify_summary.or(lower.notify_summary),
                }),
                (lower, higher) => higher.or(lower),
            },
            notify: higher.notify.or(lower.notify),
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainWatchError> {
        if let Some(schedule) = &config.schedule {
            if let Some(days) = schedule.recheck_days {
                if days < 1 {
                    return Err(DomainWatchError::config(
                        "recheck_days must be at least 1",
                    ));
                }
            }
        }

        if let Some(report) = &config.report {
            if let Some(style) = &report.style {
                style
                    .parse::<ReportStyle>()
                    .map_err(DomainWatchError::config)?;
            }
        }

        if let Some(api) = config.notify.as_ref().and_then(|n| n.telegram_api.as_ref()) {
            if !(api.starts_with("http://") || api.starts_with("https://")) {
                return Err(DomainWatchError::config(format!(
                    "telegram_api must be an http(s) URL, got '{}'",
                    api
                )));
            }
        }

        Ok(())
    }
}

/// Settings taken from `DW_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub recheck_days: Option<i64>,
    pub max_checks: Option<usize>,
    pub delay_ms: Option<u64>,
    pub report_style: Option<ReportStyle>,
    pub notify_summary: Option<bool>,
}

impl EnvConfig {
    /// Parse settings through `lookup`, which maps a variable name to its value.
    ///
    /// Invalid values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env_config = EnvConfig::default();

        // DW_RECHECK_DAYS - days between checks of one domain
        if let Some(val) = lookup("DW_RECHECK_DAYS") {
            match val.trim().parse::<i64>() {
                Ok(days) if days >= 1 => env_config.recheck_days = Some(days),
                _ => warn!("Invalid DW_RECHECK_DAYS='{}', must be a positive integer", val),
            }
        }

        // DW_MAX_CHECKS - per-run ceiling, 0 for none
        if let Some(val) = lookup("DW_MAX_CHECKS") {
            match val.trim().parse::<usize>() {
                Ok(max) => env_config.max_checks = Some(max),
                Err(_) => warn!("Invalid DW_MAX_CHECKS='{}', must be a non-negative integer", val),
            }
        }

        // DW_DELAY_MS - pause between lookups
        if let Some(val) = lookup("DW_DELAY_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) => env_config.delay_ms = Some(ms),
                Err(_) => warn!("Invalid DW_DELAY_MS='{}', must be milliseconds", val),
            }
        }

        // DW_REPORT_STYLE - full or registered
        if let Some(val) = lookup("DW_REPORT_STYLE") {
            match val.parse::<ReportStyle>() {
                Ok(style) => env_config.report_style = Some(style),
                Err(e) => warn!("Invalid DW_REPORT_STYLE: {}", e),
            }
        }

        // DW_NOTIFY_SUMMARY - push the summary to chat
        if let Some(val) = lookup("DW_NOTIFY_SUMMARY") {
            match parse_bool(&val) {
                Some(flag) => env_config.notify_summary = Some(flag),
                None => warn!("Invalid DW_NOTIFY_SUMMARY='{}', use true/false", val),
            }
        }

        env_config
    }

    /// Overlay the environment's settings on `config`.
    pub fn apply_to(&self, mut config: WatchConfig) -> WatchConfig {
        if let Some(days) = self.recheck_days {
            config = config.with_recheck_days(days);
        }
        if let Some(max_checks) = self.max_checks {
            config = config.with_max_checks(max_checks);
        }
        if let Some(delay_ms) = self.delay_ms {
            config = config.with_delay(Duration::from_millis(delay_ms));
        }
        if let Some(style) = self.report_style {
            config = config.with_report_style(style);
        }
        if let Some(notify_summary) = self.notify_summary {
            config.notify_summary = notify_summary;
        }
        config
    }
}

/// Load configuration from the process environment.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_lookup(|name| env::var(name).ok())
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
