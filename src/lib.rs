//! # Pythia Prediction Markets
//!
//! Reputation-weighted prediction markets with commit-reveal privacy and
//! oracle resolution. Participants commit a hash of a signed forecast
//! before the wager deadline, reveal it afterwards, and earn reputation
//! for correct forecasts weighted by how early they committed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PYTHIA MARKETS                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                 │
//! │  ├── fixed.rs    - Q32.32 fixed-point arithmetic and ln     │
//! │  ├── hash.rs     - Keccak-256 / SHA-256 helpers             │
//! │  ├── address.rs  - 20-byte participant identity             │
//! │  └── clock.rs    - Injected time source                     │
//! │                                                             │
//! │  proof/          - Commit-reveal binding                    │
//! │  ├── signature.rs  - secp256k1 signer recovery              │
//! │  └── commitment.rs - Prediction message and commitments     │
//! │                                                             │
//! │  market/         - Market engine                            │
//! │  ├── reward.rs   - Logarithmic reputation reward            │
//! │  ├── lifecycle.rs  - Commit / reveal / resolve              │
//! │  └── price_feeds.rs - Oracle-bucketed resolution            │
//! │                                                             │
//! │  ledger/         - Reputation token                         │
//! │  factory/        - Accounts and market registry             │
//! │  config.rs       - Runtime configuration                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Reward amounts use integer fixed point only, and markets derive their
//! phase from an injected [`Clock`], so two nodes replaying the same calls
//! reach the same balances.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod factory;
pub mod ledger;
pub mod market;
pub mod proof;

// Re-export commonly used types
pub use config::{ConfigError, PythiaConfig};
pub use crate::core::address::Address;
pub use crate::core::clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use crate::core::hash::Hash32;
pub use factory::{FactoryError, MarketFactory, PriceFeedsMarketRequest};
pub use ledger::{ReputationLedger, ReputationToken};
pub use market::{
    Amount, Market, MarketError, MarketPhase, PriceFeedsMarket, RewardEngine,
};
pub use proof::{EcdsaVerifier, PredictionSigner, SealedPrediction, SignatureVerifier};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
