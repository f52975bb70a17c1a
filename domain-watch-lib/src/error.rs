//! Error handling for watch runs.
//!
//! One error type covers every way a run can go wrong, from a single bad
//! lookup to an unreadable roster. The checker loop isolates per-domain
//! errors; only the fatal ones surface to the caller.

use thiserror::Error;

/// Main error type for domain watching operations.
#[derive(Debug, Clone, Error)]
pub enum DomainWatchError {
    /// Domain name that cannot be looked up at all
    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// DNS lookup failed for a reason other than "name does not exist"
    #[error("Resolution error for '{domain}': {message}")]
    ResolutionError { domain: String, message: String },

    /// The system resolver could not be constructed
    #[error("Resolver setup failed: {message}")]
    ResolverSetup { message: String },

    /// Roster or status file could not be read, parsed or written
    #[error("Store error at '{path}': {message}")]
    StoreError { path: String, message: String },

    /// Chat or other outbound notification failed
    #[error("Notification via {sink} failed: {message}")]
    NotificationError { sink: String, message: String },

    /// Configuration errors (invalid settings, unreadable config file)
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl DomainWatchError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new resolution error.
    pub fn resolution<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::ResolutionError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new store error.
    pub fn store<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::StoreError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new notification error.
    pub fn notification<S: Into<String>, M: Into<String>>(sink: S, message: M) -> Self {
        Self::NotificationError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Whether this error should end the run.
    ///
    /// Per-domain and notification failures are absorbed by the checker
    /// loop and the reporter; everything else stops the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::InvalidDomain { .. }
                | Self::ResolutionError { .. }
                | Self::NotificationError { .. }
        )
    }

    /// Whether this error came from a notification sink.
    pub fn is_notification(&self) -> bool {
        matches!(self, Self::NotificationError { .. })
    }
}

impl From<toml::de::Error> for DomainWatchError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
