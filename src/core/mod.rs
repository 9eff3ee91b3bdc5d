//! Core deterministic primitives.
//!
//! Fixed-point math, hashing, identities and time. Everything above this
//! layer computes on these types so reward amounts and digests are
//! reproducible across implementations.

pub mod address;
pub mod clock;
pub mod fixed;
pub mod hash;

// Re-export core types
pub use address::{Address, AddressParseError};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use fixed::{Fixed, FixedNum, FIXED_ONE, FIXED_SCALE};
pub use hash::{keccak256, Hash32, PackedHasher};
