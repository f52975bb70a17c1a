//! Protocol implementations used to decide whether a domain is registered.

/// DNS address lookups
pub mod dns;

pub use dns::{classify_lookup, DnsResolver, DomainResolver, LookupFailure};
