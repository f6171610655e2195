//! Lifecycle controller: the single authority over ledger state.
//!
//! The controller exclusively owns the record store, the correlation map,
//! the event log and the submission clock; no other component holds a
//! mutable reference to any of them.  Each operation runs to completion as
//! one atomic transaction.  The `request_*` operations return immediately
//! after registering a correlation entry; the matching `on_*_resolved`
//! callback may arrive in any order, arbitrarily delayed, or never.
//!
//! Every `on_*_resolved` entry point follows the same ladder: resolve the
//! handle (single-shot), authenticate the proof, validate the subject,
//! act.  Any failure rejects the callback and changes nothing.

use crate::correlate::{Correlator, Subject};
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::handle::{CiphertextHandle, RequestHandle};
use crate::journal::Journal;
use crate::oracle::{authenticate_callback, CallbackProof, DecryptOracle};
use crate::pricing::{surge_multiplier, DEFAULT_BASE_PRICE};
use crate::store::RecordStore;
use crate::verify::is_admissible;
use ed25519_dalek::VerifyingKey;

/// Orchestrates submissions, decrypt requests, callbacks and promotion of
/// pricing records through Computed -> Verified -> Disclosed.
#[derive(Debug)]
pub struct SurgeController {
    store: RecordStore,
    correlator: Correlator,
    events: Vec<LedgerEvent>,
    oracle_key: VerifyingKey,
    clock: u64,
    journal: Option<Journal>,
    journal_error: Option<String>,
}

impl SurgeController {
    /// Creates a controller trusting callbacks signed by `oracle_key`.
    pub fn new(oracle_key: VerifyingKey) -> Self {
        Self {
            store: RecordStore::new(),
            correlator: Correlator::new(),
            events: Vec::new(),
            oracle_key,
            clock: 0,
            journal: None,
            journal_error: None,
        }
    }

    /// Attaches an audit journal; every emitted event is also appended to
    /// disk.  Journal failures are captured, not fatal.
    pub fn attach_journal(&mut self, journal: Journal) {
        self.journal = Some(journal);
        self.journal_error = None;
    }

    /// Read-only view of the record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Events emitted so far, in order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Number of decrypt requests still awaiting their callback.
    pub fn pending_requests(&self) -> usize {
        self.correlator.pending()
    }

    /// Last journal failure, if any.
    pub fn journal_error(&self) -> Option<&str> {
        self.journal_error.as_deref()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn emit(&mut self, event: LedgerEvent) {
        if let Some(journal) = &mut self.journal {
            if let Err(err) = journal.record(&event) {
                self.journal_error = Some(err.to_string());
            }
        }
        self.events.push(event);
    }

    /// Records a demand submission and returns its id.
    pub fn submit_demand(
        &mut self,
        zone: CiphertextHandle,
        request_count: CiphertextHandle,
    ) -> u64 {
        let recorded_at = self.tick();
        let id = self.store.create_demand(zone, request_count, recorded_at);
        self.emit(LedgerEvent::DemandRecorded(id));
        id
    }

    /// Records a supply submission and returns its id.
    pub fn submit_supply(
        &mut self,
        zone: CiphertextHandle,
        available_drivers: CiphertextHandle,
    ) -> u64 {
        let recorded_at = self.tick();
        let id = self.store.create_supply(zone, available_drivers, recorded_at);
        self.emit(LedgerEvent::SupplyRecorded(id));
        id
    }

    /// Opens a decrypt request over the four handles backing one demand
    /// and one supply record.
    pub fn request_pairing(
        &mut self,
        demand_id: u64,
        supply_id: u64,
        oracle: &mut dyn DecryptOracle,
    ) -> Result<RequestHandle, LedgerError> {
        let demand = self.store.demand(demand_id)?;
        let supply = self.store.supply(supply_id)?;
        let batch = [
            demand.zone,
            demand.request_count,
            supply.zone,
            supply.available_drivers,
        ];
        let handle = oracle.request_decrypt(&batch);
        self.correlator
            .open(handle, Subject::Pairing { demand_id, supply_id })?;
        Ok(handle)
    }

    /// Processes the pairing callback and, when the zones agree, creates a
    /// pricing record in the `Computed` state.
    ///
    /// Expected cleartext: `[demand_zone, request_count, supply_zone,
    /// available_drivers]`.  A zone mismatch abandons the pairing with no
    /// record created; that is a deliberate drop, not a retryable fault.
    pub fn on_pairing_resolved(
        &mut self,
        handle: RequestHandle,
        cleartext: &[u64],
        proof: &CallbackProof,
        oracle: &mut dyn DecryptOracle,
    ) -> Result<u64, LedgerError> {
        // Resolve before authenticating so a failed proof still consumes
        // the entry; the handle cannot be probed again with fixed proofs.
        let subject = self.correlator.resolve(handle)?;
        authenticate_callback(&self.oracle_key, handle, cleartext, proof)?;
        let Subject::Pairing { demand_id, supply_id } = subject else {
            return Err(LedgerError::UnknownHandle(handle));
        };
        expect_words(cleartext, 4)?;
        // Subject ids must reference records that exist at callback time.
        self.store.demand(demand_id)?;
        self.store.supply(supply_id)?;
        let demand_zone = cleartext[0];
        let request_count = narrow_u32(cleartext[1], "request count")?;
        let supply_zone = cleartext[2];
        let available_drivers = narrow_u32(cleartext[3], "available drivers")?;
        if demand_zone != supply_zone {
            return Err(LedgerError::ZoneMismatch {
                demand_zone,
                supply_zone,
            });
        }
        let multiplier = surge_multiplier(request_count, available_drivers);
        let zone_ct = oracle.import(demand_zone);
        let multiplier_ct = oracle.import(u64::from(multiplier));
        let base_ct = oracle.import(DEFAULT_BASE_PRICE);
        let pricing_id = self.store.create_pricing(zone_ct, multiplier_ct, base_ct);
        self.emit(LedgerEvent::PricingComputed(pricing_id));
        Ok(pricing_id)
    }

    /// Opens a decrypt request over a pricing record's three handles.
    /// Legal on an already-verified record; the callback re-confirms.
    pub fn request_verification(
        &mut self,
        pricing_id: u64,
        oracle: &mut dyn DecryptOracle,
    ) -> Result<RequestHandle, LedgerError> {
        let record = self.store.pricing(pricing_id)?;
        let batch = [record.zone, record.multiplier, record.base_price];
        let handle = oracle.request_decrypt(&batch);
        self.correlator
            .open(handle, Subject::Verification { pricing_id })?;
        Ok(handle)
    }

    /// Processes the verification callback.
    ///
    /// Expected cleartext: `[zone, multiplier, base_price]`.  Returns
    /// whether the record is admissible.  An inadmissible result leaves
    /// the record unverified and emits nothing (silent rejection); the
    /// caller may issue a fresh verification request.
    pub fn on_verification_resolved(
        &mut self,
        handle: RequestHandle,
        cleartext: &[u64],
        proof: &CallbackProof,
    ) -> Result<bool, LedgerError> {
        let subject = self.correlator.resolve(handle)?;
        authenticate_callback(&self.oracle_key, handle, cleartext, proof)?;
        let Subject::Verification { pricing_id } = subject else {
            return Err(LedgerError::UnknownHandle(handle));
        };
        expect_words(cleartext, 3)?;
        self.store.pricing(pricing_id)?;
        let multiplier = narrow_u32(cleartext[1], "multiplier")?;
        let base_price = cleartext[2];
        if !is_admissible(multiplier, base_price) {
            return Ok(false);
        }
        if self.store.mark_verified(pricing_id)? {
            self.emit(LedgerEvent::PricingVerified(pricing_id));
        }
        Ok(true)
    }

    /// Opens a decrypt request over the multiplier handle alone.  Only a
    /// verified record may be disclosed.
    pub fn request_disclosure(
        &mut self,
        pricing_id: u64,
        oracle: &mut dyn DecryptOracle,
    ) -> Result<RequestHandle, LedgerError> {
        let record = self.store.pricing(pricing_id)?;
        if !record.verified() {
            return Err(LedgerError::NotVerified(pricing_id));
        }
        let batch = [record.multiplier];
        let handle = oracle.request_decrypt(&batch);
        self.correlator
            .open(handle, Subject::Disclosure { pricing_id })?;
        Ok(handle)
    }

    /// Processes the disclosure callback and yields the plaintext
    /// multiplier.  Terminal: the record moves to `Disclosed` and no
    /// further mutation applies to it.
    pub fn on_disclosure_resolved(
        &mut self,
        handle: RequestHandle,
        cleartext: &[u64],
        proof: &CallbackProof,
    ) -> Result<u64, LedgerError> {
        let subject = self.correlator.resolve(handle)?;
        authenticate_callback(&self.oracle_key, handle, cleartext, proof)?;
        let Subject::Disclosure { pricing_id } = subject else {
            return Err(LedgerError::UnknownHandle(handle));
        };
        expect_words(cleartext, 1)?;
        let record = self.store.pricing(pricing_id)?;
        if !record.verified() {
            return Err(LedgerError::NotVerified(pricing_id));
        }
        self.store.mark_disclosed(pricing_id)?;
        Ok(cleartext[0])
    }
}

fn expect_words(cleartext: &[u64], expected: usize) -> Result<(), LedgerError> {
    if cleartext.len() != expected {
        return Err(LedgerError::MalformedCleartext(format!(
            "expected {expected} words, got {}",
            cleartext.len()
        )));
    }
    Ok(())
}

fn narrow_u32(word: u64, label: &str) -> Result<u32, LedgerError> {
    u32::try_from(word)
        .map_err(|_| LedgerError::MalformedCleartext(format!("{label} {word} exceeds u32 range")))
}
