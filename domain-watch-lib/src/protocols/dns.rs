//! DNS-based registration check.
//!
//! A domain that resolves to at least one address is treated as
//! registered. A lookup that fails because the name does not exist is
//! treated as available. Anything else (timeouts, SERVFAIL, refused
//! connections) is a resolution error and leaves the status undetermined.

use crate::error::DomainWatchError;
use crate::types::DomainStatus;
use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use std::time::Duration;
use tracing::debug;

/// Capability to map a domain name to a registration status.
///
/// Implementations return `Ok(Registered)` or `Ok(NotRegistered)` for a
/// conclusive answer and `Err(ResolutionError)` when no conclusion could
/// be reached. They never retry.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn resolve(&self, domain: &str) -> Result<DomainStatus, DomainWatchError>;
}

/// Why an address lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// NXDOMAIN or an empty answer
    NotFound,
    /// Any other failure, with its description
    Other(String),
}

/// Turn a raw lookup outcome into a status.
///
/// `Ok(n)` carries the number of addresses returned.
pub fn classify_lookup(
    domain: &str,
    outcome: Result<usize, LookupFailure>,
) -> Result<DomainStatus, DomainWatchError> {
    match outcome {
        Ok(0) => Ok(DomainStatus::NotRegistered),
        Ok(_) => Ok(DomainStatus::Registered),
        Err(LookupFailure::NotFound) => Ok(DomainStatus::NotRegistered),
        Err(LookupFailure::Other(message)) => Err(DomainWatchError::resolution(domain, message)),
    }
}

/// Resolver backed by the system DNS configuration.
#[derive(Clone)]
pub struct DnsResolver {
    resolver: TokioResolver,
    /// Upper bound on a single lookup
    timeout: Duration,
}

impl DnsResolver {
    /// Create a resolver from `/etc/resolv.conf` (or the platform equivalent).
    pub fn from_system() -> Result<Self, DomainWatchError> {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a system resolver with a custom per-lookup timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainWatchError> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| DomainWatchError::ResolverSetup {
                message: format!("failed to read system resolver configuration: {}", e),
            })?
            .build();

        Ok(Self { resolver, timeout })
    }

    async fn lookup(&self, domain: &str) -> Result<usize, LookupFailure> {
        match tokio::time::timeout(self.timeout, self.resolver.lookup_ip(domain)).await {
            Ok(Ok(lookup)) => Ok(lookup.iter().count()),
            Ok(Err(e)) if e.is_nx_domain() || e.is_no_records_found() => {
                debug!(domain, error = %e, "name not found");
                Err(LookupFailure::NotFound)
            }
            Ok(Err(e)) => Err(LookupFailure::Other(e.to_string())),
            Err(_) => Err(LookupFailure::Other(format!(
                "lookup timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl DomainResolver for DnsResolver {
    async fn resolve(&self, domain: &str) -> Result<DomainStatus, DomainWatchError> {
        let outcome = self.lookup(domain).await;
        classify_lookup(domain, outcome)
    }
}
