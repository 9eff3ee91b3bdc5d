//! Prediction markets.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MARKET LAYER                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  reward.rs       - Logarithmic reputation reward            │
//! │  state.rs        - Parameters, phases, prediction records   │
//! │  events.rs       - Append-only event history                │
//! │  lifecycle.rs    - Commit / reveal / resolve state machine  │
//! │  price_feeds.rs  - Oracle-bucketed outcome strategy         │
//! │  error.rs        - Rejection taxonomy                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod events;
pub mod lifecycle;
pub mod price_feeds;
pub mod reward;
pub mod state;

pub use error::MarketError;
pub use events::{MarketEvent, MarketEventData};
pub use lifecycle::{Market, MarketSnapshot, OutcomeResolver, Resolution};
pub use price_feeds::{
    bucket_price, InMemoryPriceOracle, OracleError, PriceFeedsMarket, PriceFeedsResolver,
    PriceOracle, PriceReading,
};
pub use reward::{compute_reputation, Amount, RewardEngine, DEFAULT_REWARD_DENOMINATION};
pub use state::{MarketParams, MarketPhase, OutcomeBound, PredictionRecord};
