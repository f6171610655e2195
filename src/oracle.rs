//! Confidential compute/decrypt oracle collaborator.
//!
//! The core never performs encrypted computation itself: it hands batches
//! of ciphertext handles to an external oracle and later receives the
//! plaintext words together with an ed25519 proof binding them to the
//! request handle.  This module defines that contract, the deterministic
//! key helpers used to check the proof, and a deterministic in-memory
//! oracle for adapters and tests.

use crate::error::LedgerError;
use crate::handle::{CiphertextHandle, RequestHandle};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand_core::OsRng;
use serde::Serialize;
use sha2::{Digest, Sha512};
use std::collections::HashMap;

/// Contract the ledger requires of the external oracle.
///
/// `request_decrypt` must return a fresh, never-reused handle for every
/// call; the matching callback may arrive arbitrarily later, out of order,
/// or never.  `import` re-encrypts a plaintext computed by the controller
/// so the record store only ever holds opaque handles.
pub trait DecryptOracle {
    /// Issues an asynchronous decrypt request for the given handles and
    /// returns the oracle-assigned request handle.
    fn request_decrypt(&mut self, handles: &[CiphertextHandle]) -> RequestHandle;

    /// Encrypts a plaintext value and returns its ciphertext handle.
    fn import(&mut self, value: u64) -> CiphertextHandle;
}

/// Authenticity proof delivered alongside a decrypt callback.
#[derive(Debug, Clone)]
pub struct CallbackProof {
    /// ed25519 signature over the canonical callback payload.
    pub signature: Signature,
}

#[derive(Serialize)]
struct CanonicalCallback<'a> {
    request: RequestHandle,
    cleartext: &'a [u64],
}

/// Canonical byte encoding of a callback, signed by the oracle and
/// recomputed by the controller before any state change.
pub fn canonical_callback_payload(request: RequestHandle, cleartext: &[u64]) -> Vec<u8> {
    serde_json::to_vec(&CanonicalCallback { request, cleartext })
        .expect("callback payload serializes")
}

/// Signs a callback payload on behalf of the oracle.
pub fn sign_callback(signing: &SigningKey, request: RequestHandle, cleartext: &[u64]) -> CallbackProof {
    let payload = canonical_callback_payload(request, cleartext);
    CallbackProof {
        signature: signing.sign(&payload),
    }
}

/// Checks that `proof` authenticates `cleartext` for `request` under the
/// oracle's published key.  Fails closed with `BadProof` on any mismatch.
pub fn authenticate_callback(
    oracle_key: &VerifyingKey,
    request: RequestHandle,
    cleartext: &[u64],
    proof: &CallbackProof,
) -> Result<(), LedgerError> {
    let payload = canonical_callback_payload(request, cleartext);
    oracle_key
        .verify_strict(&payload, &proof.signature)
        .map_err(|_| LedgerError::BadProof)
}

/// Derives a deterministic signing key from a seed string.
pub fn derive_signing_key(seed: &str) -> SigningKey {
    let mut hasher = Sha512::new();
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    let mut secret = [0u8; SECRET_KEY_LENGTH];
    secret.copy_from_slice(&digest[..SECRET_KEY_LENGTH]);
    SigningKey::from_bytes(&secret)
}

/// Generates a fresh random signing key.
pub fn generate_signing_key() -> SigningKey {
    let mut rng = OsRng;
    SigningKey::generate(&mut rng)
}

/// Encodes a public key as base64 for configuration exchange.
pub fn encode_public_key_base64(verifying: &VerifyingKey) -> String {
    BASE64.encode(verifying.to_bytes())
}

/// Decodes a base64 public key.
pub fn decode_public_key_base64(input: &str) -> Result<VerifyingKey, String> {
    let bytes = BASE64.decode(input).map_err(|err| err.to_string())?;
    VerifyingKey::try_from(bytes.as_slice()).map_err(|err| err.to_string())
}

/// Deterministic in-memory oracle.
///
/// Handles count up from 1, plaintexts live in a private vault, and
/// callbacks are signed with a seed-derived key.  Multiple independent
/// instances may coexist; nothing is process-global.
#[derive(Debug)]
pub struct MockOracle {
    signing: SigningKey,
    vault: HashMap<CiphertextHandle, u64>,
    pending: HashMap<RequestHandle, Vec<CiphertextHandle>>,
    next_ciphertext: u64,
    next_request: u64,
}

impl MockOracle {
    /// Creates an oracle whose signing key is derived from `seed`.
    pub fn new(seed: &str) -> Self {
        Self {
            signing: derive_signing_key(seed),
            vault: HashMap::new(),
            pending: HashMap::new(),
            next_ciphertext: 0,
            next_request: 0,
        }
    }

    /// The key callers should configure their controller with.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    /// Produces the plaintext words and proof for a pending request,
    /// consuming it on the oracle side.
    pub fn respond(&mut self, request: RequestHandle) -> Result<(Vec<u64>, CallbackProof), String> {
        let handles = self
            .pending
            .remove(&request)
            .ok_or_else(|| format!("no pending request {request}"))?;
        let mut cleartext = Vec::with_capacity(handles.len());
        for handle in handles {
            let value = self
                .vault
                .get(&handle)
                .copied()
                .ok_or_else(|| format!("unknown ciphertext {handle}"))?;
            cleartext.push(value);
        }
        let proof = sign_callback(&self.signing, request, &cleartext);
        Ok((cleartext, proof))
    }

    /// Signs an arbitrary payload for `request`, bypassing the vault.
    /// Lets adversarial tests fabricate well-signed but wrong cleartext.
    pub fn sign_raw(&self, request: RequestHandle, cleartext: &[u64]) -> CallbackProof {
        sign_callback(&self.signing, request, cleartext)
    }
}

impl DecryptOracle for MockOracle {
    fn request_decrypt(&mut self, handles: &[CiphertextHandle]) -> RequestHandle {
        self.next_request += 1;
        let request = RequestHandle(self.next_request);
        self.pending.insert(request, handles.to_vec());
        request
    }

    fn import(&mut self, value: u64) -> CiphertextHandle {
        self.next_ciphertext += 1;
        let handle = CiphertextHandle(self.next_ciphertext);
        self.vault.insert(handle, value);
        handle
    }
}
