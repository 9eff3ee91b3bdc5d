//! Market State Definitions
//!
//! Parameters fixed at construction, the time-derived phase, and the
//! per-participant prediction records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::address::Address;
use crate::core::clock::Timestamp;
use crate::core::hash::Hash32;
use crate::market::error::MarketError;
use crate::market::reward::Amount;

// =============================================================================
// OUTCOMES
// =============================================================================

/// One outcome of a market.
///
/// Oracle-bucketed markets use numeric thresholds; other markets use
/// opaque labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBound {
    /// Inclusive upper threshold in the feed's raw units.
    ///
    /// The last outcome also catches every value above all thresholds, so
    /// its threshold only labels that bucket and never changes the answer.
    Threshold(i128),
    /// Opaque label.
    Label(String),
}

impl OutcomeBound {
    /// Threshold value, if numeric.
    pub fn threshold(&self) -> Option<i128> {
        match self {
            Self::Threshold(value) => Some(*value),
            Self::Label(_) => None,
        }
    }
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Everything fixed when a market is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Market identity; bound into every prediction signature.
    pub market: Address,
    /// Question being forecast.
    pub question: String,
    /// One bound per outcome.
    pub outcome_bounds: Vec<OutcomeBound>,
    /// Number of outcomes (at least 2).
    pub number_of_outcomes: u32,
    /// Creation time.
    pub creation_date: Timestamp,
    /// Last instant (exclusive) at which commitments are accepted.
    pub wage_deadline: Timestamp,
    /// Earliest instant at which the market may resolve.
    pub resolution_date: Timestamp,
}

impl MarketParams {
    /// Check construction invariants.
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.number_of_outcomes < 2 {
            return Err(MarketError::InvalidParameters(format!(
                "number of outcomes must be at least 2, got {}",
                self.number_of_outcomes
            )));
        }
        if self.outcome_bounds.len() != self.number_of_outcomes as usize {
            return Err(MarketError::InvalidParameters(format!(
                "expected {} outcome bounds, got {}",
                self.number_of_outcomes,
                self.outcome_bounds.len()
            )));
        }
        if self.creation_date >= self.wage_deadline {
            return Err(MarketError::InvalidParameters(format!(
                "creation date {} must precede wage deadline {}",
                self.creation_date, self.wage_deadline
            )));
        }
        if self.wage_deadline > self.resolution_date {
            return Err(MarketError::InvalidParameters(format!(
                "wage deadline {} must not follow resolution date {}",
                self.wage_deadline, self.resolution_date
            )));
        }
        Ok(())
    }

    /// Phase at `now`, given the stored answer.
    pub fn phase_at(&self, now: Timestamp, answer: Option<u32>) -> MarketPhase {
        if answer.is_some() {
            MarketPhase::Resolved
        } else if now < self.wage_deadline {
            MarketPhase::Open
        } else if now < self.resolution_date {
            MarketPhase::AwaitingReveal
        } else {
            MarketPhase::AwaitingResolution
        }
    }
}

// =============================================================================
// PHASE
// =============================================================================

/// Market lifecycle phase, derived from the clock and the answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketPhase {
    /// Accepting commitments.
    Open,
    /// Wager deadline passed, resolution date not reached.
    AwaitingReveal,
    /// Resolution date reached, no answer yet.
    AwaitingResolution,
    /// Answer stored.
    Resolved,
}

impl fmt::Display for MarketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::AwaitingReveal => "awaiting-reveal",
            Self::AwaitingResolution => "awaiting-resolution",
            Self::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

// =============================================================================
// PREDICTION RECORD
// =============================================================================

/// A participant's commitment and its reveal status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Committing identity.
    pub participant: Address,
    /// Published commitment hash.
    pub commitment_hash: Hash32,
    /// Commit time; the reward input.
    pub prediction_timestamp: Timestamp,
    /// Revealed outcome, once verified.
    pub revealed_value: Option<u64>,
    /// Reveal matched the commitment. Never reset once true.
    pub verified: bool,
    /// Reputation credited at resolution.
    pub reward: Option<Amount>,
}

impl PredictionRecord {
    /// Fresh record for a commitment accepted at `timestamp`.
    pub fn new(participant: Address, commitment_hash: Hash32, timestamp: Timestamp) -> Self {
        Self {
            participant,
            commitment_hash,
            prediction_timestamp: timestamp,
            revealed_value: None,
            verified: false,
            reward: None,
        }
    }

    /// Verified and revealed `answer`.
    pub fn is_correct(&self, answer: u32) -> bool {
        self.verified && self.revealed_value == Some(answer as u64)
    }
}
