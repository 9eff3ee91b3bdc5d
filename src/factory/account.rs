//! Market Creator Accounts
//!
//! Tracks who may create markets. A new account gets a free trial; after
//! that a paid subscription window is required. Fee collection happens
//! outside this crate; only the resulting window is recorded here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::address::Address;
use crate::core::clock::Timestamp;
use crate::factory::FactoryError;

/// Seconds per day.
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// A market creator account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// When the account was created.
    pub created_at: Timestamp,
    /// End of the paid subscription window, if ever paid.
    pub paid_until: Option<Timestamp>,
}

/// All accounts known to a factory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountBook {
    accounts: BTreeMap<Address, Account>,
    trial_period: u64,
    subscription_period: u64,
}

impl AccountBook {
    /// Create an empty book. Periods are in seconds.
    pub fn new(trial_period: u64, subscription_period: u64) -> Self {
        Self {
            accounts: BTreeMap::new(),
            trial_period,
            subscription_period,
        }
    }

    /// Trial length in seconds.
    pub fn trial_period(&self) -> u64 {
        self.trial_period
    }

    /// Register `user`.
    pub fn create_account(&mut self, user: Address, now: Timestamp) -> Result<(), FactoryError> {
        if self.accounts.contains_key(&user) {
            return Err(FactoryError::AlreadyUser(user));
        }
        self.accounts.insert(
            user,
            Account {
                created_at: now,
                paid_until: None,
            },
        );
        info!("Account {} created", user.short());
        Ok(())
    }

    /// Whether `user` has an account.
    pub fn is_user(&self, user: &Address) -> bool {
        self.accounts.contains_key(user)
    }

    /// Account details.
    pub fn account(&self, user: &Address) -> Option<&Account> {
        self.accounts.get(user)
    }

    /// Whether `user` is still inside the trial.
    pub fn is_in_trial(&self, user: &Address, now: Timestamp) -> bool {
        self.accounts
            .get(user)
            .map_or(false, |account| now < account.created_at.saturating_add(self.trial_period))
    }

    /// Whether `user` may currently create markets.
    pub fn has_active_subscription(&self, user: &Address, now: Timestamp) -> bool {
        self.is_in_trial(user, now)
            || self
                .accounts
                .get(user)
                .and_then(|account| account.paid_until)
                .map_or(false, |until| now < until)
    }

    /// Extend `user`'s paid window by one subscription period.
    ///
    /// The window starts from the later of now, the trial end, or the
    /// current paid end. Returns the new end.
    pub fn renew_subscription(&mut self, user: Address, now: Timestamp) -> Result<Timestamp, FactoryError> {
        let trial_period = self.trial_period;
        let subscription_period = self.subscription_period;
        let account = self
            .accounts
            .get_mut(&user)
            .ok_or(FactoryError::NotUser(user))?;

        let start = now
            .max(account.created_at.saturating_add(trial_period))
            .max(account.paid_until.unwrap_or(0));
        let until = start.saturating_add(subscription_period);
        account.paid_until = Some(until);

        info!("Account {} subscribed until {}", user.short(), until);
        Ok(until)
    }

    /// Reject `user` unless it may create markets now.
    pub fn ensure_can_create(&self, user: &Address, now: Timestamp) -> Result<(), FactoryError> {
        if !self.is_user(user) {
            return Err(FactoryError::NotUser(*user));
        }
        if !self.has_active_subscription(user, now) {
            return Err(FactoryError::SubscriptionExpired(*user));
        }
        Ok(())
    }
}
