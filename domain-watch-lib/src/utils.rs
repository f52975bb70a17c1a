//! Utility functions for domain name handling.
//!
//! Roster cells are user-maintained, so names are normalized on load and
//! validated before any lookup is attempted.

use crate::error::DomainWatchError;

/// Normalize a domain name read from a roster cell.
///
/// Surrounding whitespace and a single trailing root dot are removed.
/// Case is preserved so the roster key is written back unchanged.
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}

/// Validate a domain name before resolving it.
///
/// # Returns
///
/// `Ok(())` if the name is syntactically resolvable, `Err(DomainWatchError)` otherwise.
pub fn validate_domain(domain: &str) -> Result<(), DomainWatchError> {
    if domain.is_empty() {
        return Err(DomainWatchError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.len() > 253 {
        return Err(DomainWatchError::invalid_domain(
            domain,
            "Domain name longer than 253 characters",
        ));
    }

    if !domain.contains('.') {
        return Err(DomainWatchError::invalid_domain(
            domain,
            "Domain name must include a TLD",
        ));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(DomainWatchError::invalid_domain(domain, "Empty label"));
        }
        if label.len() > 63 {
            return Err(DomainWatchError::invalid_domain(
                domain,
                format!("Label '{}' longer than 63 characters", label),
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainWatchError::invalid_domain(
                domain,
                format!("Label '{}' starts or ends with a hyphen", label),
            ));
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(DomainWatchError::invalid_domain(
                domain,
                format!("Label '{}' contains invalid characters", label),
            ));
        }
    }

    Ok(())
}
