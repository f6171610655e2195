//! Single-shot correlation of decrypt requests to domain records.
//!
//! Every decrypt request issued to the oracle is registered here under the
//! handle the oracle assigned.  `resolve` atomically looks up and
//! invalidates the entry, which is the mechanism that makes every callback
//! idempotent: a handle can trigger state change at most once regardless
//! of how many times the oracle (maliciously or by retry) delivers it.
//! Abandoned entries are never expired; handles are unbounded and never
//! reused, so a stale entry occupies its slot harmlessly.

use crate::error::LedgerError;
use crate::handle::RequestHandle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The record(s) an outstanding decrypt request concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    /// Joint decryption of one demand and one supply record.
    Pairing {
        /// Id of the demand record under decryption.
        demand_id: u64,
        /// Id of the supply record under decryption.
        supply_id: u64,
    },
    /// Decryption of a pricing record's fields for admissibility checking.
    Verification {
        /// Id of the pricing record under verification.
        pricing_id: u64,
    },
    /// Decryption of a verified multiplier for public disclosure.
    Disclosure {
        /// Id of the pricing record being disclosed.
        pricing_id: u64,
    },
}

/// Maps live request handles to their subjects, one entry per handle.
#[derive(Debug, Default)]
pub struct Correlator {
    live: HashMap<RequestHandle, Subject>,
}

impl Correlator {
    /// Creates an empty correlator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new live correlation for `handle`.
    pub fn open(&mut self, handle: RequestHandle, subject: Subject) -> Result<(), LedgerError> {
        if self.live.contains_key(&handle) {
            return Err(LedgerError::DuplicateHandle(handle));
        }
        self.live.insert(handle, subject);
        Ok(())
    }

    /// Atomically looks up and invalidates the entry for `handle`.
    ///
    /// A second resolve of the same handle observes `UnknownHandle`, as
    /// does a handle that was never registered.
    pub fn resolve(&mut self, handle: RequestHandle) -> Result<Subject, LedgerError> {
        self.live
            .remove(&handle)
            .ok_or(LedgerError::UnknownHandle(handle))
    }

    /// Returns whether a correlation is currently live for `handle`.
    pub fn is_live(&self, handle: RequestHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Number of outstanding (unresolved) correlations.
    pub fn pending(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{Correlator, Subject};
    use crate::error::LedgerError;
    use crate::handle::RequestHandle;

    #[test]
    fn test_resolve_is_single_shot() {
        let mut correlator = Correlator::new();
        let handle = RequestHandle(1);
        let subject = Subject::Verification { pricing_id: 4 };
        correlator.open(handle, subject).unwrap();
        assert_eq!(correlator.resolve(handle).unwrap(), subject);
        assert_eq!(
            correlator.resolve(handle),
            Err(LedgerError::UnknownHandle(handle))
        );
    }

    #[test]
    fn test_duplicate_open_is_rejected() {
        let mut correlator = Correlator::new();
        let handle = RequestHandle(7);
        correlator
            .open(handle, Subject::Disclosure { pricing_id: 1 })
            .unwrap();
        let err = correlator
            .open(
                handle,
                Subject::Pairing {
                    demand_id: 1,
                    supply_id: 1,
                },
            )
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateHandle(handle));
        // The original subject survives the rejected open.
        assert_eq!(
            correlator.resolve(handle).unwrap(),
            Subject::Disclosure { pricing_id: 1 }
        );
    }

    #[test]
    fn test_unknown_handle_is_rejected() {
        let mut correlator = Correlator::new();
        assert_eq!(
            correlator.resolve(RequestHandle(99)),
            Err(LedgerError::UnknownHandle(RequestHandle(99)))
        );
    }

    #[test]
    fn test_pending_tracks_live_entries() {
        let mut correlator = Correlator::new();
        assert_eq!(correlator.pending(), 0);
        correlator
            .open(RequestHandle(1), Subject::Verification { pricing_id: 1 })
            .unwrap();
        correlator
            .open(RequestHandle(2), Subject::Verification { pricing_id: 2 })
            .unwrap();
        assert_eq!(correlator.pending(), 2);
        assert!(correlator.is_live(RequestHandle(1)));
        correlator.resolve(RequestHandle(1)).unwrap();
        assert_eq!(correlator.pending(), 1);
        assert!(!correlator.is_live(RequestHandle(1)));
    }
}
