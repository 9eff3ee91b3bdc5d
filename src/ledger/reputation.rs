//! Reputation Token
//!
//! Balance ledger credited by markets when verified predictions resolve
//! correctly. There is no debit path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::address::Address;
use crate::market::reward::Amount;

/// Ledger errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Crediting would overflow the total supply.
    #[error("credit of {requested} overflows total supply {total_supply}")]
    Overflow {
        /// Supply before the credit.
        total_supply: Amount,
        /// Amount requested.
        requested: Amount,
    },
}

/// Anything a market can credit reputation to.
pub trait ReputationLedger {
    /// Credit every `(account, amount)` pair, or none of them.
    fn credit_batch(&mut self, credits: &[(Address, Amount)]) -> Result<(), LedgerError>;

    /// Credit a single account.
    fn credit(&mut self, account: Address, amount: Amount) -> Result<(), LedgerError> {
        self.credit_batch(&[(account, amount)])
    }

    /// Current balance of `account`.
    fn balance_of(&self, account: &Address) -> Amount;
}

/// In-memory reputation token.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReputationToken {
    name: String,
    symbol: String,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
}

impl ReputationToken {
    /// Create an empty token.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            total_supply: 0,
            balances: BTreeMap::new(),
        }
    }

    /// Token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Number of accounts holding reputation.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }
}

impl ReputationLedger for ReputationToken {
    fn credit_batch(&mut self, credits: &[(Address, Amount)]) -> Result<(), LedgerError> {
        // Every balance is bounded by the supply, so checking the supply
        // once covers each individual balance.
        let requested = credits
            .iter()
            .try_fold(0 as Amount, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(LedgerError::Overflow {
                total_supply: self.total_supply,
                requested: Amount::MAX,
            })?;
        let new_supply = self
            .total_supply
            .checked_add(requested)
            .ok_or(LedgerError::Overflow {
                total_supply: self.total_supply,
                requested,
            })?;

        for (account, amount) in credits {
            if *amount == 0 {
                continue;
            }
            *self.balances.entry(*account).or_insert(0) += amount;
            debug!("{} credited {} {}", account.short(), amount, self.symbol);
        }
        self.total_supply = new_supply;

        Ok(())
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }
}
