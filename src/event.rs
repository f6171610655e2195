//! Domain events emitted by the lifecycle controller.
//!
//! These four events are the sole externally observable progress signals;
//! consumers read them instead of polling record state.

use serde::{Deserialize, Serialize};

/// Progress signal emitted after a successful state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A demand record was appended with the given id.
    DemandRecorded(u64),
    /// A supply record was appended with the given id.
    SupplyRecorded(u64),
    /// A pairing callback produced a pricing record with the given id.
    PricingComputed(u64),
    /// A pricing record passed the admissibility check.
    PricingVerified(u64),
}

#[cfg(test)]
mod tests {
    use super::LedgerEvent;

    #[test]
    fn test_events_serialize_compactly() {
        let line = serde_json::to_string(&LedgerEvent::PricingComputed(3)).unwrap();
        assert_eq!(line, "{\"PricingComputed\":3}");
        let back: LedgerEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(back, LedgerEvent::PricingComputed(3));
    }
}
