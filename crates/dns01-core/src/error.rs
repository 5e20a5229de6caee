//! Error types for the DNS-01 toolkit
//!
//! This module defines all error types used throughout the crate.

use std::fmt;

use thiserror::Error;

/// Result type alias for challenge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies which outbound zone-API operation a remote-call error
/// belongs to.
///
/// The sequence a provider runs is aborted at the first failure, so the
/// step also tells the caller how far the sequence got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteStep {
    /// Zone-info lookup (zone name to current zone id)
    ZoneInfo,
    /// Clone of the authoritative zone into a temporary zone
    ZoneClone,
    /// Creation of a new mutable version of the temporary zone
    VersionCreate,
    /// TXT record insert into the new version
    RecordAdd,
    /// Activation of the new version
    VersionActivate,
    /// Switching a zone's active assignment
    ZoneSet,
    /// Deletion of the temporary zone
    ZoneDelete,
}

impl RemoteStep {
    /// Stable identifier used in error messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteStep::ZoneInfo => "zone-info",
            RemoteStep::ZoneClone => "zone-clone",
            RemoteStep::VersionCreate => "zone-version-create",
            RemoteStep::RecordAdd => "zone-record-add",
            RemoteStep::VersionActivate => "zone-version-activate",
            RemoteStep::ZoneSet => "zone-set",
            RemoteStep::ZoneDelete => "zone-delete",
        }
    }
}

impl fmt::Display for RemoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for the DNS-01 toolkit
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing configuration; fatal at construction, never retried
    #[error("configuration error: {0}")]
    Config(String),

    /// The FQDN could not be mapped to an authoritative zone, or is not
    /// actually under the zone that was resolved for it
    #[error("zone discovery failed: {0}")]
    ZoneDiscovery(String),

    /// A remote zone-API call failed; the call sequence was aborted at `step`
    #[error("remote call {step} failed: {message}")]
    RemoteCall {
        /// The outbound operation that failed
        step: RemoteStep,
        /// Provider-reported failure detail
        message: String,
    },

    /// Another challenge is already mutating this authoritative zone.
    ///
    /// Distinct from the remote-call variants so callers can detect the
    /// conflict and retry after the other challenge is cleaned up.
    #[error("challenge already in progress for zone {zone}")]
    ChallengeInProgress {
        /// The contested authoritative zone name
        zone: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a zone-discovery error
    pub fn zone_discovery(msg: impl Into<String>) -> Self {
        Self::ZoneDiscovery(msg.into())
    }

    /// Create a remote-call error tagged with the step that failed
    pub fn remote(step: RemoteStep, message: impl Into<String>) -> Self {
        Self::RemoteCall {
            step,
            message: message.into(),
        }
    }

    /// Create an in-progress conflict error
    pub fn in_progress(zone: impl Into<String>) -> Self {
        Self::ChallengeInProgress { zone: zone.into() }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_carry_the_failed_step() {
        let err = Error::remote(RemoteStep::RecordAdd, "boom");
        match err {
            Error::RemoteCall { step, .. } => assert_eq!(step, RemoteStep::RecordAdd),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn display_names_the_step() {
        let err = Error::remote(RemoteStep::ZoneSet, "endpoint unreachable");
        assert_eq!(
            err.to_string(),
            "remote call zone-set failed: endpoint unreachable"
        );
    }

    #[test]
    fn in_progress_conflicts_are_matchable() {
        let err = Error::in_progress("example.com.");
        assert!(matches!(
            err,
            Error::ChallengeInProgress { ref zone } if zone == "example.com."
        ));
    }
}
