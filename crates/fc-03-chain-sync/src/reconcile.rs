//! # Unconfirmed Transaction Reconciliation
//!
//! After a fork switch, transactions from the abandoned segment that the
//! winning segment did not re-include must return to the unconfirmed
//! pool. The winning segment's hashes filter the unwound transactions.

use std::collections::HashSet;

use shared_types::{Hash, TransactionInfo};

/// Transactions removed by the unwind that the new chain does not confirm.
pub fn collect_reverted_transaction_infos(
    added_hashes: &HashSet<Hash>,
    removed: Vec<TransactionInfo>,
) -> Vec<TransactionInfo> {
    removed
        .into_iter()
        .filter(|info| !added_hashes.contains(&info.entity_hash))
        .collect()
}
