//! Signature Verification
//!
//! Recovers the identity that signed a 32-byte message and compares it to a
//! claimed identity. Recovery is separate from message construction: callers
//! hash their own domain-specific tuple (see `commitment.rs`) and hand the
//! digest here.
//!
//! Signatures are 65 bytes `r ‖ s ‖ v` over the wallet signed-message digest
//! of the message. `v` may be `0/1` or `27/28`.

use std::fmt;

use libsecp256k1::{Message, PublicKey, RecoveryId, SecretKey, Signature};
use thiserror::Error;

use crate::core::address::Address;
use crate::core::hash::{signed_message_hash, Hash32};

/// Length of a recoverable signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recovers signing identities from message digests.
pub trait SignatureVerifier {
    /// Identity that produced `signature` over `message_hash`, if any.
    fn recover_signer(&self, message_hash: &Hash32, signature: &[u8]) -> Option<Address>;

    /// True iff `signature` over `message_hash` recovers to `claimed_signer`.
    ///
    /// Malformed signatures return false.
    fn verify(&self, claimed_signer: &Address, message_hash: &Hash32, signature: &[u8]) -> bool {
        self.recover_signer(message_hash, signature)
            .map_or(false, |signer| signer == *claimed_signer)
    }
}

/// secp256k1 public key recovery.
#[derive(Clone, Copy, Debug, Default)]
pub struct EcdsaVerifier;

impl SignatureVerifier for EcdsaVerifier {
    fn recover_signer(&self, message_hash: &Hash32, signature: &[u8]) -> Option<Address> {
        let bytes: &[u8; SIGNATURE_LENGTH] = signature.try_into().ok()?;

        let v = match bytes[64] {
            v @ 0..=1 => v,
            v @ 27..=28 => v - 27,
            _ => return None,
        };
        let recovery_id = RecoveryId::parse(v).ok()?;

        let parsed = Signature::parse_standard_slice(&bytes[..64]).ok()?;
        // Only the low-s form is canonical
        if parsed.s.is_high() {
            return None;
        }

        let digest = Message::parse(&signed_message_hash(message_hash));
        let public_key = libsecp256k1::recover(&digest, &parsed, &recovery_id).ok()?;

        Some(Address::from_uncompressed_public_key(&public_key.serialize()))
    }
}

/// Errors creating a signer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Secret key is zero or not below the curve order.
    #[error("invalid secret key")]
    InvalidSecretKey,
}

/// Client-side signer for prediction messages.
///
/// Holds a secp256k1 secret key. Key custody is the caller's concern.
#[derive(Clone)]
pub struct PredictionSigner {
    secret: SecretKey,
    address: Address,
}

impl PredictionSigner {
    /// Create from a 32-byte secret key.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, SignatureError> {
        let secret = SecretKey::parse(bytes).map_err(|_| SignatureError::InvalidSecretKey)?;
        let public_key = PublicKey::from_secret_key(&secret);
        Ok(Self {
            secret,
            address: Address::from_uncompressed_public_key(&public_key.serialize()),
        })
    }

    /// Identity this signer signs as.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte message, returning `r ‖ s ‖ v` with `v` in `27/28`.
    pub fn sign_message(&self, message_hash: &Hash32) -> [u8; SIGNATURE_LENGTH] {
        let digest = Message::parse(&signed_message_hash(message_hash));
        let (signature, recovery_id) = libsecp256k1::sign(&digest, &self.secret);

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&signature.serialize());
        out[64] = 27 + recovery_id.serialize();
        out
    }
}

impl fmt::Debug for PredictionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
