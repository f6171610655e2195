//! Failure taxonomy for ledger operations.
//!
//! Every rejection is local to the operation that raised it: no variant
//! implies partial mutation of any record, and none triggers an automatic
//! retry.  The only retry path is the caller re-issuing a request, which
//! allocates a fresh correlation handle.

use crate::handle::RequestHandle;
use std::fmt;
use thiserror::Error;

/// Record kind referenced by an id-based lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Demand submission records.
    Demand,
    /// Supply submission records.
    Supply,
    /// Computed pricing records.
    Pricing,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demand => write!(f, "demand"),
            Self::Supply => write!(f, "supply"),
            Self::Pricing => write!(f, "pricing"),
        }
    }
}

/// Errors raised by the ledger state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown {kind} id {id}")]
    /// A referenced record id lies outside the allocated range.
    InvalidIds {
        /// Kind of record the lookup targeted.
        kind: RecordKind,
        /// The offending id.
        id: u64,
    },
    #[error("correlation handle {0} is already live")]
    /// A second correlation entry was opened for a handle still in flight.
    DuplicateHandle(RequestHandle),
    #[error("no live correlation for handle {0}")]
    /// Correlation miss: the handle was never issued, was already consumed
    /// (replay), or was delivered to the wrong entry point.
    UnknownHandle(RequestHandle),
    #[error("callback proof failed authentication")]
    /// The authenticity proof did not verify against the oracle key.  The
    /// correlation entry is consumed regardless, so the handle cannot be
    /// probed again with a corrected proof.
    BadProof,
    #[error("paired records disagree on zone ({demand_zone} != {supply_zone})")]
    /// Demand and supply decrypted to different zones; the pairing is
    /// abandoned and no pricing record is created.
    ZoneMismatch {
        /// Plaintext zone of the demand record.
        demand_zone: u64,
        /// Plaintext zone of the supply record.
        supply_zone: u64,
    },
    #[error("pricing record {0} has not been verified")]
    /// Disclosure was requested before the record passed verification.
    NotVerified(u64),
    #[error("malformed cleartext: {0}")]
    /// The oracle cleartext tuple had the wrong arity or a word outside the
    /// expected width.
    MalformedCleartext(String),
    #[error("journal error: {0}")]
    /// Audit-journal I/O or parse failure.  Never raised by domain
    /// operations themselves.
    Journal(String),
}

#[cfg(test)]
mod tests {
    use super::{LedgerError, RecordKind};
    use crate::handle::RequestHandle;

    #[test]
    fn test_error_messages_name_the_subject() {
        let err = LedgerError::InvalidIds {
            kind: RecordKind::Supply,
            id: 9,
        };
        assert_eq!(err.to_string(), "unknown supply id 9");
        let err = LedgerError::UnknownHandle(RequestHandle(3));
        assert_eq!(err.to_string(), "no live correlation for handle rq:3");
        let err = LedgerError::ZoneMismatch {
            demand_zone: 1,
            supply_zone: 2,
        };
        assert!(err.to_string().contains("1 != 2"));
    }
}
