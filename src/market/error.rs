//! Market errors.
//!
//! Every error rejects the whole call; no state is mutated on error.

use thiserror::Error;

use crate::core::address::Address;
use crate::core::clock::Timestamp;
use crate::ledger::LedgerError;
use crate::market::price_feeds::OracleError;

/// Rejections raised by market entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Participant already holds a commitment in this market.
    #[error("{0} has already predicted")]
    AlreadyPredicted(Address),

    /// Wager deadline has passed.
    #[error("market is no longer active: deadline {deadline}, now {now}")]
    MarketClosed {
        /// Wager deadline.
        deadline: Timestamp,
        /// Time of the call.
        now: Timestamp,
    },

    /// No commitment exists for the identity.
    #[error("{0} has not predicted")]
    NotPredicted(Address),

    /// Signature is not the one the identity committed to.
    #[error("wrong signature submitted for {0}")]
    WrongSignature(Address),

    /// Prediction was already verified.
    #[error("{0} has already verified its prediction")]
    AlreadyVerified(Address),

    /// Resolution date has not arrived.
    #[error("resolution date {resolution_date} has not arrived (now {now})")]
    TooEarly {
        /// Resolution date.
        resolution_date: Timestamp,
        /// Time of the call.
        now: Timestamp,
    },

    /// Market already has an answer.
    #[error("market already resolved to outcome {answer}")]
    AlreadyResolved {
        /// Stored answer.
        answer: u32,
    },

    /// Oracle could not supply an authoritative value; retry later.
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),

    /// Outcome strategy produced an index outside the market.
    #[error("outcome {index} out of range for {number_of_outcomes} outcomes")]
    InvalidOutcome {
        /// Produced index.
        index: u32,
        /// Number of outcomes.
        number_of_outcomes: u32,
    },

    /// Construction parameters violate market invariants.
    #[error("invalid market parameters: {0}")]
    InvalidParameters(String),

    /// Reputation ledger rejected the payouts.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
