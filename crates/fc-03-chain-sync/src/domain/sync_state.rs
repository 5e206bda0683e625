//! Working context threaded through a synchronization round.

use shared_types::{BlockElement, ChainScore, TransactionInfo};

/// Everything the commit phase needs from preprocessing and unwinding.
#[derive(Debug)]
pub struct SyncState {
    /// The common ancestor the peer chain attaches to.
    pub common: BlockElement,
    /// Score of the local blocks above the common ancestor.
    pub local_score: ChainScore,
    /// Score of the peer blocks relative to the common ancestor.
    pub peer_score: ChainScore,
    removed_transaction_infos: Vec<TransactionInfo>,
}

impl SyncState {
    pub fn new(common: BlockElement) -> Self {
        Self {
            common,
            local_score: ChainScore::default(),
            peer_score: ChainScore::default(),
            removed_transaction_infos: Vec::new(),
        }
    }

    /// Record transactions removed from the chain by the unwind walk.
    pub fn push_removed_transaction_infos(&mut self, infos: impl IntoIterator<Item = TransactionInfo>) {
        self.removed_transaction_infos.extend(infos);
    }

    /// Net score change if the peer chain is accepted.
    pub fn score_delta(&self) -> ChainScore {
        self.peer_score - self.local_score
    }

    /// Take ownership of the removed transactions, leaving none behind.
    pub fn detach_removed_transaction_infos(&mut self) -> Vec<TransactionInfo> {
        std::mem::take(&mut self.removed_transaction_infos)
    }
}
