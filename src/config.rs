//! Runtime configuration.
//!
//! Loaded from `PYTHIA_*` environment variables or a JSON document.
//! Missing fields fall back to [`PythiaConfig::default`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::market::reward::{DEFAULT_REWARD_DENOMINATION, MAX_REWARD_DENOMINATION};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidVar {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// JSON document could not be parsed.
    #[error("invalid config document: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed value outside its accepted range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings shared by a factory and the markets it creates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythiaConfig {
    /// Decimal exponent of the reward scale.
    pub reward_denomination: u32,
    /// Free trial length for new accounts, in days.
    pub trial_period_days: u64,
    /// Length of one paid subscription period, in days.
    pub subscription_period_days: u64,
    /// Reputation token name.
    pub token_name: String,
    /// Reputation token symbol.
    pub token_symbol: String,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for PythiaConfig {
    fn default() -> Self {
        Self {
            reward_denomination: DEFAULT_REWARD_DENOMINATION,
            trial_period_days: 30,
            subscription_period_days: 30,
            token_name: "Pythia Reputation".into(),
            token_symbol: "REP".into(),
            log_filter: "info".into(),
        }
    }
}

impl PythiaConfig {
    /// Load from `PYTHIA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("PYTHIA_REWARD_DENOMINATION") {
            config.reward_denomination = parse_var("PYTHIA_REWARD_DENOMINATION", value)?;
        }
        if let Some(value) = lookup("PYTHIA_TRIAL_PERIOD_DAYS") {
            config.trial_period_days = parse_var("PYTHIA_TRIAL_PERIOD_DAYS", value)?;
        }
        if let Some(value) = lookup("PYTHIA_SUBSCRIPTION_PERIOD_DAYS") {
            config.subscription_period_days = parse_var("PYTHIA_SUBSCRIPTION_PERIOD_DAYS", value)?;
        }
        if let Some(value) = lookup("PYTHIA_TOKEN_NAME") {
            config.token_name = value;
        }
        if let Some(value) = lookup("PYTHIA_TOKEN_SYMBOL") {
            config.token_symbol = value;
        }
        if let Some(value) = lookup("PYTHIA_LOG") {
            config.log_filter = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reward_denomination > MAX_REWARD_DENOMINATION {
            return Err(ConfigError::Invalid(format!(
                "reward_denomination {} exceeds {}",
                self.reward_denomination, MAX_REWARD_DENOMINATION
            )));
        }
        if self.subscription_period_days == 0 {
            return Err(ConfigError::Invalid("subscription_period_days must be positive".into()));
        }
        if self.token_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("token_symbol is empty".into()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { key, value })
}
