//! Hashing for Commitments and Identities
//!
//! Provides deterministic hashing for:
//! - Packed-tuple prediction messages (Keccak-256)
//! - Signed-message digests for signature recovery
//! - Market identity derivation (SHA-256 with domain separator)

use sha2::Sha256;
use sha3::{Digest, Keccak256};

use super::address::Address;

/// Hash output type (256 bits / 32 bytes)
pub type Hash32 = [u8; 32];

/// Prefix applied to a 32-byte message before it is signed.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 hasher over tightly packed values.
///
/// Each update appends the value's canonical packed encoding with no
/// padding between fields, so the order of updates is part of the digest.
pub struct PackedHasher {
    hasher: Keccak256,
}

impl Default for PackedHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PackedHasher {
    /// Create an empty hasher.
    pub fn new() -> Self {
        Self {
            hasher: Keccak256::new(),
        }
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u64 widened to a 256-bit big-endian word.
    #[inline]
    pub fn update_u256(&mut self, value: u64) {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        self.hasher.update(word);
    }

    /// Update with a 20-byte address.
    #[inline]
    pub fn update_address(&mut self, address: &Address) {
        self.hasher.update(address.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> Hash32 {
        self.hasher.finalize().into()
    }
}

/// Keccak-256 of arbitrary data.
pub fn keccak256(data: &[u8]) -> Hash32 {
    Keccak256::digest(data).into()
}

/// Digest that a wallet actually signs for a 32-byte message.
pub fn signed_message_hash(message: &Hash32) -> Hash32 {
    let mut hasher = PackedHasher::new();
    hasher.update_bytes(SIGNED_MESSAGE_PREFIX);
    hasher.update_bytes(message);
    hasher.finalize()
}

/// SHA-256 with domain separator.
pub fn sha256_with_domain(domain: &[u8], data: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_known_vector() {
        // keccak256("") is a well-known constant
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_u256_encoding_is_left_padded() {
        let mut packed = PackedHasher::new();
        packed.update_u256(2);
        let mut word = [0u8; 32];
        word[31] = 2;
        assert_eq!(packed.finalize(), keccak256(&word));
    }

    #[test]
    fn test_hash_order_matters() {
        let a = Address::new([1; 20]);
        let b = Address::new([2; 20]);

        let hash1 = {
            let mut h = PackedHasher::new();
            h.update_address(&a);
            h.update_address(&b);
            h.finalize()
        };

        let hash2 = {
            let mut h = PackedHasher::new();
            h.update_address(&b);
            h.update_address(&a);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_signed_message_hash_differs_from_message() {
        let message = keccak256(b"prediction");
        assert_ne!(signed_message_hash(&message), message);
        assert_ne!(signed_message_hash(&message), keccak256(&message));

        let mut prefixed = SIGNED_MESSAGE_PREFIX.to_vec();
        prefixed.extend_from_slice(&message);
        assert_eq!(signed_message_hash(&message), keccak256(&prefixed));
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];

        let hash1 = sha256_with_domain(b"DOMAIN_A", &data);
        let hash2 = sha256_with_domain(b"DOMAIN_B", &data);

        assert_ne!(hash1, hash2);
    }
}
