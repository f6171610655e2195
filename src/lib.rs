#![deny(missing_docs)]

//! # surge_house
//!
//! **surge_house** lets an operator publish aggregate supply/demand
//! signals in a form nobody (including the operator) can read in the
//! clear, derive a surge multiplier from them via a fixed public formula,
//! and let any outside party confirm — without ever seeing the inputs —
//! that the published multiplier was produced honestly.
//!
//! The arithmetic is a three-branch lookup; the substance is the protocol
//! around it.  Decrypt requests issued to the external confidential
//! compute oracle are asynchronous, so every request is registered in a
//! single-shot correlation map keyed by the oracle-assigned handle.  The
//! matching callback resolves that entry exactly once (replays and
//! forgeries observe `UnknownHandle`), authenticates its ed25519 proof,
//! and only then advances the target record.  Pricing records move
//! strictly forward through `Computed -> Verified -> Disclosed`.
//!
//! ## Modules
//!
//! * [`handle`] — opaque ciphertext and request-handle tokens.
//! * [`store`] — append-only demand/supply/pricing storage with dense,
//!   per-kind id allocation.
//! * [`correlate`] — the single-shot request correlator.
//! * [`pricing`] — the deterministic, integer-only multiplier formula.
//! * [`verify`] — the admissibility range check.
//! * [`oracle`] — the decrypt-oracle contract, proof authentication and a
//!   deterministic in-memory oracle.
//! * [`controller`] — the lifecycle state machine orchestrating all of
//!   the above.
//! * [`event`] / [`journal`] — emitted progress signals and their
//!   replayable on-disk audit trail.
//!
//! ## Usage
//!
//! ```rust
//! use surge_house::{DecryptOracle, MockOracle, SurgeController};
//!
//! let mut oracle = MockOracle::new("docs");
//! let mut controller = SurgeController::new(oracle.verifying_key());
//!
//! let zone = 7u64;
//! let demand = controller.submit_demand(oracle.import(zone), oracle.import(180));
//! let supply = controller.submit_supply(oracle.import(zone), oracle.import(100));
//!
//! let request = controller.request_pairing(demand, supply, &mut oracle).unwrap();
//! let (cleartext, proof) = oracle.respond(request).unwrap();
//! let pricing = controller
//!     .on_pairing_resolved(request, &cleartext, &proof, &mut oracle)
//!     .unwrap();
//! assert_eq!(pricing, 1);
//! ```

pub mod controller;
pub mod correlate;
pub mod error;
pub mod event;
pub mod handle;
pub mod journal;
pub mod oracle;
pub mod pricing;
pub mod store;
pub mod verify;

pub use controller::SurgeController;
pub use correlate::{Correlator, Subject};
pub use error::{LedgerError, RecordKind};
pub use event::LedgerEvent;
pub use handle::{CiphertextHandle, RequestHandle};
pub use journal::Journal;
pub use oracle::{
    authenticate_callback, decode_public_key_base64, derive_signing_key, encode_public_key_base64,
    generate_signing_key, sign_callback, CallbackProof, DecryptOracle, MockOracle,
};
pub use pricing::{surge_multiplier, DEFAULT_BASE_PRICE, MAX_SURGE, MULTIPLIER_SCALE, NO_SURGE};
pub use store::{DemandRecord, PricingRecord, PricingState, RecordStore, SupplyRecord};
pub use verify::is_admissible;
