//! Append-only storage for demand, supply, and pricing records.
//!
//! Ids are dense, start at 1, and are assigned in creation order per kind;
//! no id is ever reused.  Demand and supply records are immutable after
//! creation.  Pricing records carry a state that only moves forward
//! (Computed -> Verified -> Disclosed); the store is the sole writer of
//! that state and enforces the monotone promotion.

use crate::error::{LedgerError, RecordKind};
use crate::handle::CiphertextHandle;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a pricing record.  Transitions only move right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PricingState {
    /// Created by a successful pairing; multiplier computed but unchecked.
    Computed,
    /// Admissibility check passed; plaintext disclosure is now authorized.
    Verified,
    /// Multiplier released in the clear.  Terminal.
    Disclosed,
}

/// One demand submission.  Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandRecord {
    /// Dense id, starting at 1.
    pub id: u64,
    /// Encrypted zone identifier.
    pub zone: CiphertextHandle,
    /// Encrypted ride-request count.
    pub request_count: CiphertextHandle,
    /// Server-assigned creation tick.
    pub recorded_at: u64,
}

/// One supply submission.  Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRecord {
    /// Dense id, starting at 1.
    pub id: u64,
    /// Encrypted zone identifier.
    pub zone: CiphertextHandle,
    /// Encrypted available-driver count.
    pub available_drivers: CiphertextHandle,
    /// Server-assigned creation tick.
    pub recorded_at: u64,
}

/// A computed pricing result awaiting verification and disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRecord {
    /// Dense id, starting at 1.
    pub id: u64,
    /// Encrypted zone identifier shared by the contributing records.
    pub zone: CiphertextHandle,
    /// Encrypted surge multiplier.
    pub multiplier: CiphertextHandle,
    /// Encrypted base price.
    pub base_price: CiphertextHandle,
    state: PricingState,
}

impl PricingRecord {
    /// Current lifecycle state.
    pub fn state(&self) -> PricingState {
        self.state
    }

    /// Whether the record has passed verification.  Monotone: once true it
    /// never reverts.
    pub fn verified(&self) -> bool {
        self.state >= PricingState::Verified
    }
}

/// Durable, append-only record storage with per-kind id allocation.
#[derive(Debug, Default)]
pub struct RecordStore {
    demands: Vec<DemandRecord>,
    supplies: Vec<SupplyRecord>,
    pricings: Vec<PricingRecord>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a demand record and returns its id.
    pub fn create_demand(
        &mut self,
        zone: CiphertextHandle,
        request_count: CiphertextHandle,
        recorded_at: u64,
    ) -> u64 {
        let id = self.demands.len() as u64 + 1;
        self.demands.push(DemandRecord {
            id,
            zone,
            request_count,
            recorded_at,
        });
        id
    }

    /// Appends a supply record and returns its id.
    pub fn create_supply(
        &mut self,
        zone: CiphertextHandle,
        available_drivers: CiphertextHandle,
        recorded_at: u64,
    ) -> u64 {
        let id = self.supplies.len() as u64 + 1;
        self.supplies.push(SupplyRecord {
            id,
            zone,
            available_drivers,
            recorded_at,
        });
        id
    }

    /// Appends a pricing record in the `Computed` state and returns its id.
    pub fn create_pricing(
        &mut self,
        zone: CiphertextHandle,
        multiplier: CiphertextHandle,
        base_price: CiphertextHandle,
    ) -> u64 {
        let id = self.pricings.len() as u64 + 1;
        self.pricings.push(PricingRecord {
            id,
            zone,
            multiplier,
            base_price,
            state: PricingState::Computed,
        });
        id
    }

    /// Looks up a demand record by id.
    pub fn demand(&self, id: u64) -> Result<&DemandRecord, LedgerError> {
        lookup(&self.demands, id, RecordKind::Demand)
    }

    /// Looks up a supply record by id.
    pub fn supply(&self, id: u64) -> Result<&SupplyRecord, LedgerError> {
        lookup(&self.supplies, id, RecordKind::Supply)
    }

    /// Looks up a pricing record by id.
    pub fn pricing(&self, id: u64) -> Result<&PricingRecord, LedgerError> {
        lookup(&self.pricings, id, RecordKind::Pricing)
    }

    /// Promotes a pricing record to `Verified`.
    ///
    /// Returns true when the record newly flipped, false when it was
    /// already verified (re-verification is a no-op, never a regression).
    pub fn mark_verified(&mut self, id: u64) -> Result<bool, LedgerError> {
        let record = lookup_mut(&mut self.pricings, id, RecordKind::Pricing)?;
        if record.state >= PricingState::Verified {
            return Ok(false);
        }
        record.state = PricingState::Verified;
        Ok(true)
    }

    /// Promotes a verified pricing record to `Disclosed`.  A record already
    /// disclosed stays disclosed.
    pub fn mark_disclosed(&mut self, id: u64) -> Result<(), LedgerError> {
        let record = lookup_mut(&mut self.pricings, id, RecordKind::Pricing)?;
        if record.state >= PricingState::Verified {
            record.state = PricingState::Disclosed;
        }
        Ok(())
    }

    /// All demand records in creation order.
    pub fn demands(&self) -> &[DemandRecord] {
        &self.demands
    }

    /// All supply records in creation order.
    pub fn supplies(&self) -> &[SupplyRecord] {
        &self.supplies
    }

    /// All pricing records in creation order.
    pub fn pricings(&self) -> &[PricingRecord] {
        &self.pricings
    }
}

fn lookup<T>(records: &[T], id: u64, kind: RecordKind) -> Result<&T, LedgerError> {
    id.checked_sub(1)
        .and_then(|idx| records.get(idx as usize))
        .ok_or(LedgerError::InvalidIds { kind, id })
}

fn lookup_mut<T>(records: &mut [T], id: u64, kind: RecordKind) -> Result<&mut T, LedgerError> {
    id.checked_sub(1)
        .and_then(|idx| records.get_mut(idx as usize))
        .ok_or(LedgerError::InvalidIds { kind, id })
}

#[cfg(test)]
mod tests {
    use super::{PricingState, RecordStore};
    use crate::error::{LedgerError, RecordKind};
    use crate::handle::CiphertextHandle;
    use proptest::prelude::*;

    fn ct(x: u64) -> CiphertextHandle {
        CiphertextHandle(x)
    }

    #[test]
    fn test_ids_are_dense_per_kind() {
        let mut store = RecordStore::new();
        assert_eq!(store.create_demand(ct(1), ct(2), 1), 1);
        assert_eq!(store.create_demand(ct(3), ct(4), 2), 2);
        assert_eq!(store.create_supply(ct(5), ct(6), 3), 1);
        assert_eq!(store.create_pricing(ct(7), ct(8), ct(9)), 1);
        assert_eq!(store.demand(2).unwrap().zone, ct(3));
        assert_eq!(store.supply(1).unwrap().available_drivers, ct(6));
    }

    #[test]
    fn test_lookup_out_of_range_is_an_error() {
        let mut store = RecordStore::new();
        store.create_demand(ct(1), ct(2), 1);
        assert_eq!(
            store.demand(0),
            Err(LedgerError::InvalidIds {
                kind: RecordKind::Demand,
                id: 0
            })
        );
        assert_eq!(
            store.demand(2),
            Err(LedgerError::InvalidIds {
                kind: RecordKind::Demand,
                id: 2
            })
        );
        assert!(store.pricing(1).is_err());
    }

    #[test]
    fn test_pricing_promotion_is_monotone() {
        let mut store = RecordStore::new();
        let id = store.create_pricing(ct(1), ct(2), ct(3));
        assert_eq!(store.pricing(id).unwrap().state(), PricingState::Computed);
        assert!(!store.pricing(id).unwrap().verified());
        assert!(store.mark_verified(id).unwrap());
        assert!(store.pricing(id).unwrap().verified());
        // Re-verification is a no-op, not a flip back.
        assert!(!store.mark_verified(id).unwrap());
        assert_eq!(store.pricing(id).unwrap().state(), PricingState::Verified);
        store.mark_disclosed(id).unwrap();
        assert_eq!(store.pricing(id).unwrap().state(), PricingState::Disclosed);
        assert!(store.pricing(id).unwrap().verified());
        // Verifying a disclosed record changes nothing.
        assert!(!store.mark_verified(id).unwrap());
        assert_eq!(store.pricing(id).unwrap().state(), PricingState::Disclosed);
    }

    #[test]
    fn test_disclose_skips_unverified_records() {
        let mut store = RecordStore::new();
        let id = store.create_pricing(ct(1), ct(2), ct(3));
        store.mark_disclosed(id).unwrap();
        assert_eq!(store.pricing(id).unwrap().state(), PricingState::Computed);
    }

    proptest! {
        #[test]
        fn prop_demand_ids_count_from_one(n in 1usize..64) {
            let mut store = RecordStore::new();
            for expected in 1..=n as u64 {
                let id = store.create_demand(ct(expected), ct(expected), expected);
                prop_assert_eq!(id, expected);
            }
            prop_assert_eq!(store.demands().len(), n);
        }
    }
}
