//! DNS-01 challenge material
//!
//! Turns a domain plus its ACME key authorization into the record that
//! proves control of the domain: the `_acme-challenge.` FQDN and the
//! TXT value mandated by RFC 8555 §8.4.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Record name prefix used for DNS-01 validation.
const CHALLENGE_LABEL: &str = "_acme-challenge";

/// The record a provider has to publish for one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeInfo {
    /// Fully-qualified record name, trailing dot included
    /// (e.g. `_acme-challenge.example.com.`)
    pub effective_fqdn: String,

    /// TXT record value: unpadded base64url of the SHA-256 digest of the
    /// key authorization
    pub value: String,
}

/// Compute the challenge record for `domain`.
///
/// The challenge token is already folded into `key_auth` by the ACME
/// layer, so the key authorization alone determines the record value.
pub fn challenge_info(domain: &str, key_auth: &str) -> ChallengeInfo {
    let digest = Sha256::digest(key_auth.as_bytes());

    ChallengeInfo {
        effective_fqdn: to_fqdn(&format!("{CHALLENGE_LABEL}.{}", un_fqdn(domain))),
        value: URL_SAFE_NO_PAD.encode(digest),
    }
}

/// Appends the trailing dot unless `name` already carries one.
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Strips the trailing dot, if any.
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Derives the record label of `fqdn` relative to the authoritative `zone`.
///
/// `_acme-challenge.foo.example.com.` under `example.com.` yields
/// `_acme-challenge.foo`. Fails when the FQDN is not under the zone, and
/// for the zone apex itself (there is no relative label to insert).
pub fn extract_sub_domain(fqdn: &str, zone: &str) -> Result<String> {
    let name = un_fqdn(fqdn);
    let zone = un_fqdn(zone);

    if name == zone {
        return Err(Error::zone_discovery(format!(
            "unable to derive a subdomain: {name} is the apex of zone {zone}"
        )));
    }

    match name.strip_suffix(&format!(".{zone}")) {
        Some(sub) => Ok(sub.to_string()),
        None => Err(Error::zone_discovery(format!(
            "unable to derive a subdomain: {name} is not under zone {zone}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_info_computes_fqdn_and_digest() {
        let info = challenge_info("example.com", "key");
        assert_eq!(info.effective_fqdn, "_acme-challenge.example.com.");
        // base64url(sha256("key")), unpadded
        assert_eq!(info.value, "LHDhK3oGRvkiefQnx7OOczTY5Tic_xZ6HcMOc_gmtoM");
    }

    #[test]
    fn challenge_info_accepts_an_already_qualified_domain() {
        let info = challenge_info("example.com.", "snip.snap");
        assert_eq!(info.effective_fqdn, "_acme-challenge.example.com.");
        assert_eq!(info.value, "s_f6VVaVz5uN8Ri0lqpYgnueugUhzCEfm2l2LW6Kod0");
    }

    #[test]
    fn fqdn_helpers_round_trip() {
        assert_eq!(to_fqdn("example.com"), "example.com.");
        assert_eq!(to_fqdn("example.com."), "example.com.");
        assert_eq!(un_fqdn("example.com."), "example.com");
        assert_eq!(un_fqdn("example.com"), "example.com");
    }

    #[test]
    fn sub_domain_is_relative_to_the_zone() {
        let sub = extract_sub_domain("_acme-challenge.foo.example.com.", "example.com.").unwrap();
        assert_eq!(sub, "_acme-challenge.foo");
    }

    #[test]
    fn sub_domain_requires_the_zone_to_be_a_suffix() {
        let err = extract_sub_domain("_acme-challenge.example.org.", "example.com.").unwrap_err();
        assert!(matches!(err, Error::ZoneDiscovery(_)));

        // A textual suffix without a label boundary is not "under" the zone.
        let err = extract_sub_domain("fooexample.com.", "example.com.").unwrap_err();
        assert!(matches!(err, Error::ZoneDiscovery(_)));
    }

    #[test]
    fn apex_has_no_sub_domain() {
        let err = extract_sub_domain("example.com.", "example.com.").unwrap_err();
        assert!(matches!(err, Error::ZoneDiscovery(_)));
    }
}
