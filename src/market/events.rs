//! Market Events
//!
//! Append-only history of state changes in a market.

use serde::{Deserialize, Serialize};

use crate::core::address::Address;
use crate::core::clock::Timestamp;
use crate::core::hash::Hash32;
use crate::market::reward::Amount;

/// Market event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEventData {
    /// Commitment accepted
    PredictionCommitted {
        participant: Address,
        commitment_hash: Hash32,
    },

    /// Reveal matched the commitment
    PredictionVerified { participant: Address, value: u64 },

    /// Answer stored
    MarketResolved { answer: u32, winners: u32 },

    /// Reputation paid to a correct participant
    ReputationCredited { participant: Address, amount: Amount },
}

/// A market event with the time it was recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Clock reading of the call that produced the event
    pub timestamp: Timestamp,

    /// Event data
    pub data: MarketEventData,
}

impl MarketEvent {
    /// Create a new event.
    pub fn new(timestamp: Timestamp, data: MarketEventData) -> Self {
        Self { timestamp, data }
    }

    /// Participant the event concerns, if any.
    pub fn participant(&self) -> Option<Address> {
        match &self.data {
            MarketEventData::PredictionCommitted { participant, .. }
            | MarketEventData::PredictionVerified { participant, .. }
            | MarketEventData::ReputationCredited { participant, .. } => Some(*participant),
            MarketEventData::MarketResolved { .. } => None,
        }
    }
}
