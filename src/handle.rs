//! Opaque token types shared across the ledger.
//!
//! Ciphertext handles reference values encrypted under the confidential
//! compute scheme; request handles identify one outstanding decrypt request
//! issued to the oracle.  The core never inspects the content behind a
//! ciphertext handle — only the oracle callback ever produces plaintext.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a value held encrypted by the confidential compute
/// oracle.  Holders of ledger state learn nothing from the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(
    /// Raw token value assigned by the oracle.
    pub u64,
);

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:{}", hex::encode(self.0.to_be_bytes()))
    }
}

/// Identity of one outstanding decrypt request, supplied by the oracle when
/// the request is issued.  Handles are unbounded and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestHandle(
    /// Raw request identifier assigned by the oracle.
    pub u64,
);

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rq:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CiphertextHandle, RequestHandle};

    #[test]
    fn test_handle_display_is_stable() {
        assert_eq!(CiphertextHandle(1).to_string(), "ct:0000000000000001");
        assert_eq!(RequestHandle(42).to_string(), "rq:42");
    }

    #[test]
    fn test_handles_round_trip_through_json() {
        let ct = CiphertextHandle(77);
        let encoded = serde_json::to_string(&ct).unwrap();
        let decoded: CiphertextHandle = serde_json::from_str(&encoded).unwrap();
        assert_eq!(ct, decoded);
    }
}
