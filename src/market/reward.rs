//! Reputation Reward Engine
//!
//! ```text
//! marketLength       = wageDeadline - creationDate
//! timeBeforeDeadline = wageDeadline - predictionTimestamp
//! reward = 10^denomination * ln(marketLength) * ln(numberOfOutcomes)
//!          * timeBeforeDeadline / marketLength
//! ```
//!
//! Evaluated in Q32.32 fixed point so every node computes the same amount.
//! `predictionTimestamp` is the commit time, never the reveal time.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::clock::Timestamp;
use crate::core::fixed::{fixed_ln_int, fixed_mul, fixed_ratio, FixedNum, FIXED_SCALE};

/// Reputation token amount in base units.
pub type Amount = u128;

/// Default decimal exponent of the reward scale (10^6).
pub const DEFAULT_REWARD_DENOMINATION: u32 = 6;

/// Largest accepted denomination; 10^38 still fits in `u128`.
pub const MAX_REWARD_DENOMINATION: u32 = 38;

/// Pure reward computation, parameterized by the decimal scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEngine {
    denomination: u32,
}

impl Default for RewardEngine {
    fn default() -> Self {
        Self::new(DEFAULT_REWARD_DENOMINATION)
    }
}

impl RewardEngine {
    /// Create an engine scaling rewards by `10^denomination`.
    ///
    /// Denominations above [`MAX_REWARD_DENOMINATION`] are clamped.
    pub const fn new(denomination: u32) -> Self {
        let denomination = if denomination > MAX_REWARD_DENOMINATION {
            MAX_REWARD_DENOMINATION
        } else {
            denomination
        };
        Self { denomination }
    }

    /// Decimal exponent of the scale.
    pub fn denomination(&self) -> u32 {
        self.denomination
    }

    /// `10^denomination`.
    pub fn scale(&self) -> Amount {
        10u128.pow(self.denomination)
    }

    /// Reward for a correct prediction committed at `prediction_timestamp`.
    ///
    /// Total over all inputs: a non-positive market length or a commit
    /// after the deadline yields 0, and the final scaling saturates.
    pub fn compute_reputation(
        &self,
        wage_deadline: Timestamp,
        creation_date: Timestamp,
        prediction_timestamp: Timestamp,
        number_of_outcomes: u32,
    ) -> Amount {
        if wage_deadline <= creation_date {
            return 0;
        }

        let market_length = wage_deadline - creation_date;
        let time_before_deadline = wage_deadline.saturating_sub(prediction_timestamp);

        let log_product = fixed_mul(
            fixed_ln_int(market_length),
            fixed_ln_int(number_of_outcomes as u64),
        );
        // Clamp: a commit before creation earns no more than one at creation
        let earliness = fixed_ratio(time_before_deadline.min(market_length), market_length);

        debug!(
            "Reward: ln(L)*ln(N) = {}, earliness = {}",
            FixedNum(log_product),
            FixedNum(earliness)
        );

        let weighted = ((log_product as u128) * (earliness as u128)) >> FIXED_SCALE;
        weighted.saturating_mul(self.scale()) >> FIXED_SCALE
    }
}

/// Reward with the default denomination.
pub fn compute_reputation(
    wage_deadline: Timestamp,
    creation_date: Timestamp,
    prediction_timestamp: Timestamp,
    number_of_outcomes: u32,
) -> Amount {
    RewardEngine::default().compute_reputation(
        wage_deadline,
        creation_date,
        prediction_timestamp,
        number_of_outcomes,
    )
}

// =============================================================================
// TESTS
// =============================================================================
