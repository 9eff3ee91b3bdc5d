//! Price-Feed Markets
//!
//! Resolves a market by reading a price oracle once at or after the
//! resolution date and bucketing the value by the market's thresholds.
//!
//! Bucket `i` holds values `<= thresholds[i]` that no earlier bucket holds;
//! anything above every threshold falls in the last bucket.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::clock::{Clock, Timestamp};
use crate::market::error::MarketError;
use crate::market::lifecycle::{Market, OutcomeResolver};
use crate::market::reward::RewardEngine;
use crate::market::state::MarketParams;

/// A single oracle observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    /// Raw value, scaled by `10^decimals`.
    pub value: i128,
    /// Decimal places in `value`.
    pub decimals: u8,
    /// Time the value was observed.
    pub timestamp: Timestamp,
}

/// Oracle failures. All are retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Oracle could not be reached.
    #[error("oracle unreachable: {0}")]
    Unreachable(String),

    /// Oracle does not serve this feed.
    #[error("unknown feed {0}")]
    UnknownFeed(String),

    /// Latest value predates the resolution date.
    #[error("feed {feed} last updated at {observed_at}, need a value at or after {required_from}")]
    Stale {
        /// Feed identifier.
        feed: String,
        /// Time of the latest value.
        observed_at: Timestamp,
        /// Resolution date.
        required_from: Timestamp,
    },
}

/// External price oracle.
pub trait PriceOracle: Send + Sync {
    /// Latest observation for `feed`.
    fn read_latest(&self, feed: &str) -> Result<PriceReading, OracleError>;
}

/// In-memory oracle; values are pushed by the host.
#[derive(Debug, Default)]
pub struct InMemoryPriceOracle {
    readings: RwLock<BTreeMap<String, PriceReading>>,
}

impl InMemoryPriceOracle {
    /// Create an oracle with no feeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a reading for `feed`, replacing the previous one.
    pub fn publish(&self, feed: impl Into<String>, reading: PriceReading) -> Result<(), OracleError> {
        let mut readings = self
            .readings
            .write()
            .map_err(|_| OracleError::Unreachable("price store poisoned".into()))?;
        readings.insert(feed.into(), reading);
        Ok(())
    }
}

impl PriceOracle for InMemoryPriceOracle {
    fn read_latest(&self, feed: &str) -> Result<PriceReading, OracleError> {
        let readings = self
            .readings
            .read()
            .map_err(|_| OracleError::Unreachable("price store poisoned".into()))?;
        readings
            .get(feed)
            .copied()
            .ok_or_else(|| OracleError::UnknownFeed(feed.to_string()))
    }
}

/// Map `value` to its bucket given ascending `thresholds`.
///
/// Values above every threshold land in the last bucket, so the last
/// threshold has no effect on the result.
pub fn bucket_price(value: i128, thresholds: &[i128]) -> u32 {
    thresholds
        .iter()
        .position(|threshold| value <= *threshold)
        .unwrap_or(thresholds.len().saturating_sub(1)) as u32
}

/// Outcome strategy backed by a price oracle.
#[derive(Clone)]
pub struct PriceFeedsResolver {
    feed: String,
    oracle: Arc<dyn PriceOracle>,
}

impl PriceFeedsResolver {
    /// Resolve from `feed` on `oracle`.
    pub fn new(feed: impl Into<String>, oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            feed: feed.into(),
            oracle,
        }
    }

    /// Feed identifier.
    pub fn feed(&self) -> &str {
        &self.feed
    }

    fn thresholds(params: &MarketParams) -> Option<Vec<i128>> {
        params.outcome_bounds.iter().map(|bound| bound.threshold()).collect()
    }
}

impl OutcomeResolver for PriceFeedsResolver {
    fn validate(&self, params: &MarketParams) -> Result<(), MarketError> {
        let thresholds = Self::thresholds(params).ok_or_else(|| {
            MarketError::InvalidParameters("price feed markets need numeric thresholds".into())
        })?;
        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MarketError::InvalidParameters(
                "price thresholds must be strictly ascending".into(),
            ));
        }
        if self.feed.is_empty() {
            return Err(MarketError::InvalidParameters("empty feed identifier".into()));
        }
        Ok(())
    }

    fn determine_outcome(&self, params: &MarketParams, _now: Timestamp) -> Result<u32, MarketError> {
        let reading = self.oracle.read_latest(&self.feed).map_err(|e| {
            warn!("Oracle read for {} failed: {}", self.feed, e);
            e
        })?;

        if reading.timestamp < params.resolution_date {
            warn!(
                "Feed {} is stale ({} < {})",
                self.feed, reading.timestamp, params.resolution_date
            );
            return Err(OracleError::Stale {
                feed: self.feed.clone(),
                observed_at: reading.timestamp,
                required_from: params.resolution_date,
            }
            .into());
        }

        let thresholds = Self::thresholds(params).ok_or_else(|| {
            MarketError::InvalidParameters("price feed markets need numeric thresholds".into())
        })?;
        let outcome = bucket_price(reading.value, &thresholds);

        info!(
            "Feed {} read {} (decimals {}) at {}: outcome {}",
            self.feed, reading.value, reading.decimals, reading.timestamp, outcome
        );
        Ok(outcome)
    }
}

/// Market resolved from a price feed.
pub type PriceFeedsMarket = Market<PriceFeedsResolver>;

impl Market<PriceFeedsResolver> {
    /// Create a market resolved from `feed` on `oracle`.
    pub fn with_price_feed(
        params: MarketParams,
        feed: impl Into<String>,
        oracle: Arc<dyn PriceOracle>,
        clock: Arc<dyn Clock>,
        rewards: RewardEngine,
    ) -> Result<Self, MarketError> {
        Market::new(params, PriceFeedsResolver::new(feed, oracle), clock, rewards)
    }
}

// =============================================================================
// TESTS
// =============================================================================
