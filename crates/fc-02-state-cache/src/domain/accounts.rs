//! # Account Sub-State
//!
//! Balance, effective balance and importance per signer. The effective
//! balance is the time-weighted snapshot consumed by the consensus
//! eligibility predicate.

use serde::{Deserialize, Serialize};

/// Consensus-relevant state of a single account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Spendable balance in base units.
    pub balance: u64,
    /// Time-weighted balance snapshot used for block-hit eligibility.
    pub effective_balance: u64,
    /// Importance weight from the last recalculation.
    pub importance: u64,
}

impl AccountState {
    /// Create an account with equal balance and effective balance.
    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance,
            effective_balance: balance,
            importance: 0,
        }
    }
}
