//! Market factory and creator accounts.
//!
//! Thin layer in front of the market engine: gates creation by
//! subscription, assigns market identities, and stores markets keyed by
//! identity. Every mutating call takes `&mut self`, so the host's call
//! serialization is the only concurrency control needed.

pub mod account;
pub mod registry;

use thiserror::Error;

use crate::core::address::Address;
use crate::market::error::MarketError;

pub use account::{Account, AccountBook, SECONDS_PER_DAY};
pub use registry::{derive_market_id, MarketFactory, PriceFeedsMarketRequest};

/// Factory errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// Account already exists.
    #[error("user already exists: {0}")]
    AlreadyUser(Address),

    /// No account for this identity.
    #[error("not a user: {0}")]
    NotUser(Address),

    /// Trial over and no paid window covers now.
    #[error("subscription expired for {0}")]
    SubscriptionExpired(Address),

    /// No market with this identity.
    #[error("unknown market {0}")]
    UnknownMarket(Address),

    /// Market rejected the call.
    #[error(transparent)]
    Market(#[from] MarketError),
}
