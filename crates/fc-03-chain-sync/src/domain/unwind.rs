//! # Unwind Bookkeeping
//!
//! When a peer chain forks below the local tip, every local block above
//! the fork point is undone in full and the fork-point block is undone
//! exactly once, non-destructively. These types carry what the walk
//! produced: the score the abandoned segment contributed, the
//! transactions it contained, and the config boundaries it announced.

use std::collections::BTreeSet;

use shared_types::{ChainScore, TransactionInfo};

/// How a block's state effects are undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoMode {
    /// The block leaves the chain; reverse everything it applied.
    Rollback,
    /// The block stays the chain tip; refresh derived bookkeeping only.
    Common,
}

/// Accumulated output of unwinding to the common ancestor.
#[derive(Debug, Default)]
pub struct UnwindResult {
    /// Score contributed by the unwound blocks relative to the ancestor.
    pub score: ChainScore,
    /// Transactions from the unwound blocks, in undo order.
    pub transaction_infos: Vec<TransactionInfo>,
    /// Effective config heights announced by the unwound blocks.
    pub config_heights: BTreeSet<u64>,
}
