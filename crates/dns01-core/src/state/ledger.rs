// # Challenge Ledger
//
// Tracks every challenge a provider has published but not yet cleaned up:
// a map from effective FQDN to the provider-specific undo payload, plus
// the set of authoritative zones currently being mutated.
//
// Both sides live in one structure so the invariant (a zone is marked
// in-progress if and only if some FQDN under it has a pending entry)
// cannot be broken by updating one side without the other.
//
// ## Locking
//
// The ledger itself is plain data. The owning provider wraps it in a
// `tokio::sync::Mutex` and holds the guard across its whole remote-call
// sequence, which serializes challenges process-wide and keeps the
// in-progress check and the zone mutations atomic with respect to each
// other. A std mutex would not do: the guard must live across `.await`.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

#[derive(Debug)]
struct Entry<T> {
    zone: String,
    undo: T,
}

/// Bookkeeping for in-flight challenges, keyed by effective FQDN.
///
/// `T` is whatever the provider needs to reverse a published challenge
/// (for a zone-swap registrar: the original and temporary zone ids).
#[derive(Debug)]
pub struct ChallengeLedger<T> {
    pending: HashMap<String, Entry<T>>,
    zones_in_progress: HashSet<String>,
}

impl<T> ChallengeLedger<T> {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            zones_in_progress: HashSet::new(),
        }
    }

    /// Whether some FQDN under `zone` has a pending challenge
    pub fn zone_in_progress(&self, zone: &str) -> bool {
        self.zones_in_progress.contains(zone)
    }

    /// Record a published challenge.
    ///
    /// Exactly one entry may exist per FQDN; a duplicate is reported as an
    /// in-progress conflict for its zone.
    pub fn record(&mut self, fqdn: impl Into<String>, zone: impl Into<String>, undo: T) -> Result<()> {
        let fqdn = fqdn.into();
        let zone = zone.into();

        if self.pending.contains_key(&fqdn) {
            return Err(Error::in_progress(zone));
        }

        self.zones_in_progress.insert(zone.clone());
        self.pending.insert(fqdn, Entry { zone, undo });
        Ok(())
    }

    /// Consume the pending entry for `fqdn`, clearing its zone's
    /// in-progress marker.
    ///
    /// Returns the zone name and the undo payload, or `None` when nothing
    /// is pending for this FQDN.
    pub fn take(&mut self, fqdn: &str) -> Option<(String, T)> {
        let entry = self.pending.remove(fqdn)?;
        self.zones_in_progress.remove(&entry.zone);
        Some((entry.zone, entry.undo))
    }

    /// Number of pending challenges
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no challenge is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for ChallengeLedger<T> {
    fn default() -> Self {
        Self::new()
    }
}
