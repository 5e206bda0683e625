//! # State Cache Errors

use thiserror::Error;

/// Errors from state cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateCacheError {
    /// A delta was requested while another is still outstanding.
    ///
    /// The sync path runs one attempt at a time, so this indicates a
    /// programming error rather than a wait condition.
    #[error("a state cache delta is already active")]
    DeltaAlreadyActive,

    /// A commit would move the visible height backwards.
    #[error("commit height {requested} regresses below current height {current}")]
    HeightRegression {
        /// Current visible height.
        current: u64,
        /// Requested commit height.
        requested: u64,
    },

    /// An account debit exceeded the available balance.
    #[error("insufficient balance: have {available}, need {needed}")]
    InsufficientBalance {
        /// Balance available.
        available: u64,
        /// Amount required.
        needed: u64,
    },
}
