//! Zone and record-name resolution
//!
//! Maps the host's view of a challenge (`resolvedZone`, `resolvedFQDN`) onto
//! the provider's: the zone name exactly as the provider knows it, and the
//! record name relative to that zone (the provider's "RR").

use crate::error::{Error, Result};
use crate::traits::{DnsClient, SearchMode};

/// Marker for a record at the zone apex
pub const APEX: &str = "@";

/// Strip one trailing root `.` from a name
///
/// ```
/// use dns01_core::resolver::un_fqdn;
///
/// assert_eq!(un_fqdn("example.com."), "example.com");
/// assert_eq!(un_fqdn("example.com"), "example.com");
/// ```
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Look up the provider's canonical name for `zone`
///
/// The zone is searched in [`SearchMode::Exact`] mode and the first match
/// wins. Returns [`Error::ZoneNotFound`] when the provider has no such zone.
pub async fn get_hosted_zone(client: &dyn DnsClient, zone: &str) -> Result<String> {
    let name = un_fqdn(zone);

    let zones = client.describe_zones(name, SearchMode::Exact).await?;
    let Some(found) = zones.into_iter().next() else {
        return Err(Error::zone_not_found(name));
    };

    tracing::debug!(
        zone = %name,
        canonical = %found.name,
        provider = client.provider_name(),
        "Resolved hosted zone"
    );
    Ok(found.name)
}

/// Record name of `fqdn` relative to `domain`
///
/// The comparison is ASCII case-insensitive. A name equal to the zone maps to
/// [`APEX`]. A name outside the zone is returned whole (without the trailing
/// dot) and a warning is logged; use [`try_extract_rr`] to reject it instead.
///
/// ```
/// use dns01_core::resolver::extract_rr;
///
/// assert_eq!(extract_rr("_acme-challenge.example.com.", "example.com"), "_acme-challenge");
/// assert_eq!(extract_rr("_acme-challenge.other.org.", "example.com"), "_acme-challenge.other.org");
/// ```
pub fn extract_rr(fqdn: &str, domain: &str) -> String {
    match relative_name(fqdn, domain) {
        Some(rr) => rr.to_string(),
        None => {
            let name = un_fqdn(fqdn);
            tracing::warn!(
                fqdn = %name,
                zone = %un_fqdn(domain),
                "Challenge name is not inside the zone, using the full name as record"
            );
            name.to_string()
        }
    }
}

/// Strict variant of [`extract_rr`]
///
/// Fails with [`Error::ZoneMismatch`] when `fqdn` is not inside `domain`.
pub fn try_extract_rr(fqdn: &str, domain: &str) -> Result<String> {
    relative_name(fqdn, domain)
        .map(str::to_string)
        .ok_or_else(|| Error::ZoneMismatch {
            fqdn: un_fqdn(fqdn).to_string(),
            zone: un_fqdn(domain).to_string(),
        })
}

fn relative_name<'a>(fqdn: &'a str, domain: &str) -> Option<&'a str> {
    let name = un_fqdn(fqdn);
    let domain = un_fqdn(domain);

    if domain.is_empty() || name.is_empty() {
        return None;
    }
    if name.eq_ignore_ascii_case(domain) {
        return Some(APEX);
    }

    // Need at least one label plus the separating dot before the zone
    if name.len() <= domain.len() + 1 {
        return None;
    }
    let split = name.len() - domain.len();
    if !name.is_char_boundary(split - 1) {
        return None;
    }
    let (prefix, suffix) = name.split_at(split - 1);
    if suffix.as_bytes()[0] == b'.' && suffix[1..].eq_ignore_ascii_case(domain) {
        Some(prefix)
    } else {
        None
    }
}
