//! Prediction Commitment Protocol
//!
//! Commit to a prediction before the wager deadline, reveal it afterwards.
//!
//! ```text
//! message    = keccak256(uint256(value) ‖ participant ‖ market)
//! signature  = sign(participant_key, message)
//! commitment = keccak256(signature)
//! ```
//!
//! Only `commitment` is published at prediction time. Binding the market
//! identity into the message stops a signature produced for one market
//! from being replayed in another.

use serde::{Deserialize, Serialize};

use crate::core::address::Address;
use crate::core::hash::{keccak256, Hash32, PackedHasher};
use crate::proof::signature::{PredictionSigner, SignatureVerifier};

/// Message a participant signs for `value` in `market`.
pub fn prediction_message(value: u64, participant: &Address, market: &Address) -> Hash32 {
    let mut hasher = PackedHasher::new();
    hasher.update_u256(value);
    hasher.update_address(participant);
    hasher.update_address(market);
    hasher.finalize()
}

/// Commitment hash published for a signature.
pub fn commitment_hash(signature: &[u8]) -> Hash32 {
    keccak256(signature)
}

/// Outcome of checking a reveal against a stored commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealCheck {
    /// Signature is the committed one and signs the claimed value.
    Matches,
    /// Signature is the committed one but does not sign the claimed value.
    ValueMismatch,
    /// Signature is not the one committed to.
    CommitmentMismatch,
}

/// Check a reveal `(value, signature)` for `participant` in `market`.
pub fn check_reveal<V: SignatureVerifier>(
    verifier: &V,
    commitment: &Hash32,
    participant: &Address,
    market: &Address,
    value: u64,
    signature: &[u8],
) -> RevealCheck {
    if commitment_hash(signature) != *commitment {
        return RevealCheck::CommitmentMismatch;
    }

    let message = prediction_message(value, participant, market);
    if verifier.verify(participant, &message, signature) {
        RevealCheck::Matches
    } else {
        RevealCheck::ValueMismatch
    }
}

/// A prediction sealed by its participant, kept private until reveal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedPrediction {
    /// Predicted outcome index.
    pub value: u64,
    /// Signing identity.
    pub participant: Address,
    /// Market the prediction is bound to.
    pub market: Address,
    /// Signature over the prediction message (65 bytes).
    pub signature: Vec<u8>,
    /// Commitment hash to publish.
    pub commitment: Hash32,
}

impl SealedPrediction {
    /// Sign and seal `value` for `market`.
    pub fn seal(signer: &PredictionSigner, value: u64, market: Address) -> Self {
        let participant = signer.address();
        let message = prediction_message(value, &participant, &market);
        let signature = signer.sign_message(&message).to_vec();
        let commitment = commitment_hash(&signature);

        Self {
            value,
            participant,
            market,
            signature,
            commitment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::signature::EcdsaVerifier;

    fn signer(seed: u8) -> PredictionSigner {
        PredictionSigner::from_secret_bytes(&[seed; 32]).unwrap()
    }

    const MARKET: Address = Address::new([0x4d; 20]);

    #[test]
    fn test_message_layout() {
        let participant = Address::new([1; 20]);
        let mut packed = Vec::with_capacity(72);
        packed.extend_from_slice(&[0u8; 31]);
        packed.push(2);
        packed.extend_from_slice(participant.as_bytes());
        packed.extend_from_slice(MARKET.as_bytes());

        assert_eq!(prediction_message(2, &participant, &MARKET), keccak256(&packed));
    }

    #[test]
    fn test_message_binds_market() {
        let participant = Address::new([1; 20]);
        let other_market = Address::new([0x4e; 20]);
        assert_ne!(
            prediction_message(1, &participant, &MARKET),
            prediction_message(1, &participant, &other_market)
        );
    }

    #[test]
    fn test_sealed_prediction_reveals() {
        let alice = signer(1);
        let sealed = SealedPrediction::seal(&alice, 1, MARKET);

        assert_eq!(sealed.commitment, commitment_hash(&sealed.signature));
        assert_eq!(
            check_reveal(
                &EcdsaVerifier,
                &sealed.commitment,
                &alice.address(),
                &MARKET,
                1,
                &sealed.signature
            ),
            RevealCheck::Matches
        );
    }

    #[test]
    fn test_wrong_value_is_value_mismatch() {
        let alice = signer(1);
        let sealed = SealedPrediction::seal(&alice, 1, MARKET);

        assert_eq!(
            check_reveal(
                &EcdsaVerifier,
                &sealed.commitment,
                &alice.address(),
                &MARKET,
                0,
                &sealed.signature
            ),
            RevealCheck::ValueMismatch
        );
    }

    #[test]
    fn test_foreign_signature_is_commitment_mismatch() {
        let alice = signer(1);
        let sealed = SealedPrediction::seal(&alice, 1, MARKET);
        let other = SealedPrediction::seal(&alice, 1, Address::new([9; 20]));

        assert_eq!(
            check_reveal(
                &EcdsaVerifier,
                &sealed.commitment,
                &alice.address(),
                &MARKET,
                1,
                &other.signature
            ),
            RevealCheck::CommitmentMismatch
        );
    }

    #[test]
    fn test_reveal_for_other_participant_is_value_mismatch() {
        let alice = signer(1);
        let bob = signer(2);
        let sealed = SealedPrediction::seal(&alice, 1, MARKET);

        assert_eq!(
            check_reveal(
                &EcdsaVerifier,
                &sealed.commitment,
                &bob.address(),
                &MARKET,
                1,
                &sealed.signature
            ),
            RevealCheck::ValueMismatch
        );
    }
}
