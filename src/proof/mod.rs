//! Commit-Reveal Proofs
//!
//! Binds a revealed prediction to the identity that committed it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF LAYER                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  signature.rs    - secp256k1 signer recovery + signing      │
//! │  commitment.rs   - Prediction message, commitment, reveal   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod commitment;
pub mod signature;

// Re-export key types
pub use commitment::{
    check_reveal, commitment_hash, prediction_message, RevealCheck, SealedPrediction,
};
pub use signature::{
    EcdsaVerifier, PredictionSigner, SignatureError, SignatureVerifier, SIGNATURE_LENGTH,
};
