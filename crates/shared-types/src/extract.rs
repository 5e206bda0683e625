//! Helpers lifting transaction hashes and infos out of block elements.

use crate::entities::{BlockElement, Hash, TransactionInfo};
use std::collections::HashSet;

/// Collect the entity hashes of every transaction in a batch of elements.
pub fn extract_transaction_hashes(elements: &[BlockElement]) -> HashSet<Hash> {
    let mut hashes = HashSet::new();
    for element in elements {
        for hash in &element.transaction_hashes {
            hashes.insert(*hash);
        }
    }
    hashes
}

/// Append all of an element's transactions to `infos`, preserving order.
pub fn extract_transaction_infos(infos: &mut Vec<TransactionInfo>, element: &BlockElement) {
    for (transaction, hash) in element.transactions_with_hashes() {
        infos.push(TransactionInfo {
            transaction: transaction.clone(),
            entity_hash: *hash,
        });
    }
}
