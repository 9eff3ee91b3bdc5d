//! Reputation ledger collaborator.

pub mod reputation;

pub use reputation::{LedgerError, ReputationLedger, ReputationToken};
