//! Market Factory and Registry
//!
//! Creates price-feed markets for subscribed accounts, stores them keyed by
//! market identity, and routes calls to them. All markets created by one
//! factory credit the same reputation token.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PythiaConfig;
use crate::core::address::Address;
use crate::core::clock::{Clock, Timestamp};
use crate::core::hash::{sha256_with_domain, Hash32};
use crate::factory::account::{AccountBook, SECONDS_PER_DAY};
use crate::factory::FactoryError;
use crate::ledger::ReputationToken;
use crate::market::lifecycle::Resolution;
use crate::market::price_feeds::{PriceFeedsMarket, PriceOracle};
use crate::market::reward::RewardEngine;
use crate::market::state::{MarketParams, OutcomeBound};

/// Domain separator for market identity derivation.
const MARKET_ID_DOMAIN: &[u8] = b"PYTHIA_MARKET_V1";

/// Parameters a creator supplies for a price-feed market.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFeedsMarketRequest {
    /// Question being forecast.
    pub question: String,
    /// Ascending price thresholds, one per outcome.
    pub thresholds: Vec<i128>,
    /// Number of outcomes.
    pub number_of_outcomes: u32,
    /// Wager deadline.
    pub wage_deadline: Timestamp,
    /// Resolution date.
    pub resolution_date: Timestamp,
    /// Oracle feed identifier.
    pub feed: String,
}

/// Derive the identity of the `nonce`-th market created by `creator`.
pub fn derive_market_id(creator: &Address, nonce: u64) -> Address {
    let mut data = Vec::with_capacity(28);
    data.extend_from_slice(creator.as_bytes());
    data.extend_from_slice(&nonce.to_le_bytes());
    let hash = sha256_with_domain(MARKET_ID_DOMAIN, &data);

    let mut id = [0u8; 20];
    id.copy_from_slice(&hash[..20]);
    Address::new(id)
}

/// Creates and owns markets.
pub struct MarketFactory {
    accounts: AccountBook,
    markets: BTreeMap<Address, PriceFeedsMarket>,
    token: ReputationToken,
    rewards: RewardEngine,
    clock: Arc<dyn Clock>,
    nonce: u64,
}

impl MarketFactory {
    /// Create a factory from configuration.
    pub fn new(config: &PythiaConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: AccountBook::new(
                config.trial_period_days.saturating_mul(SECONDS_PER_DAY),
                config.subscription_period_days.saturating_mul(SECONDS_PER_DAY),
            ),
            markets: BTreeMap::new(),
            token: ReputationToken::new(config.token_name.clone(), config.token_symbol.clone()),
            rewards: RewardEngine::new(config.reward_denomination),
            clock,
            nonce: 0,
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register `caller` as a market creator.
    pub fn create_account(&mut self, caller: Address) -> Result<(), FactoryError> {
        self.accounts.create_account(caller, self.clock.now())
    }

    /// Whether `user` has an account.
    pub fn is_user(&self, user: &Address) -> bool {
        self.accounts.is_user(user)
    }

    /// Whether `user` is still inside the trial.
    pub fn is_in_trial(&self, user: &Address) -> bool {
        self.accounts.is_in_trial(user, self.clock.now())
    }

    /// Whether `user` may create markets now.
    pub fn has_active_subscription(&self, user: &Address) -> bool {
        self.accounts.has_active_subscription(user, self.clock.now())
    }

    /// Trial length in seconds.
    pub fn trial_period(&self) -> u64 {
        self.accounts.trial_period()
    }

    /// Extend `caller`'s paid subscription by one period.
    pub fn renew_subscription(&mut self, caller: Address) -> Result<Timestamp, FactoryError> {
        self.accounts.renew_subscription(caller, self.clock.now())
    }

    // =========================================================================
    // Markets
    // =========================================================================

    /// Create a price-feed market owned by this factory.
    pub fn create_price_feeds_market(
        &mut self,
        caller: Address,
        request: PriceFeedsMarketRequest,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Address, FactoryError> {
        let now = self.clock.now();
        self.accounts.ensure_can_create(&caller, now)?;

        let market_id = derive_market_id(&caller, self.nonce);
        let params = MarketParams {
            market: market_id,
            question: request.question,
            outcome_bounds: request
                .thresholds
                .into_iter()
                .map(OutcomeBound::Threshold)
                .collect(),
            number_of_outcomes: request.number_of_outcomes,
            creation_date: now,
            wage_deadline: request.wage_deadline,
            resolution_date: request.resolution_date,
        };

        let market = PriceFeedsMarket::with_price_feed(
            params,
            request.feed,
            oracle,
            self.clock.clone(),
            self.rewards,
        )?;

        self.nonce += 1;
        self.markets.insert(market_id, market);
        info!("Factory: {} created market {}", caller.short(), market_id);

        Ok(market_id)
    }

    /// Market by identity.
    pub fn market(&self, market_id: &Address) -> Option<&PriceFeedsMarket> {
        self.markets.get(market_id)
    }

    /// Identities of all markets, in order.
    pub fn market_ids(&self) -> impl Iterator<Item = &Address> {
        self.markets.keys()
    }

    /// Commit a prediction in `market_id`.
    pub fn predict(
        &mut self,
        market_id: &Address,
        caller: Address,
        commitment_hash: Hash32,
    ) -> Result<(), FactoryError> {
        Ok(self.market_mut(market_id)?.predict(caller, commitment_hash)?)
    }

    /// Reveal a prediction in `market_id`.
    pub fn verify_prediction(
        &mut self,
        market_id: &Address,
        participant: Address,
        claimed_value: u64,
        signature: &[u8],
    ) -> Result<bool, FactoryError> {
        Ok(self
            .market_mut(market_id)?
            .verify_prediction(participant, claimed_value, signature)?)
    }

    /// Resolve `market_id`, crediting the shared reputation token.
    pub fn resolve(&mut self, market_id: &Address) -> Result<Resolution, FactoryError> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or(FactoryError::UnknownMarket(*market_id))?;
        Ok(market.resolve(&mut self.token)?)
    }

    /// Shared reputation token.
    pub fn reputation_token(&self) -> &ReputationToken {
        &self.token
    }

    fn market_mut(&mut self, market_id: &Address) -> Result<&mut PriceFeedsMarket, FactoryError> {
        self.markets
            .get_mut(market_id)
            .ok_or(FactoryError::UnknownMarket(*market_id))
    }
}
