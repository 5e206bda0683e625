//! # Chain Link and Scoring Utilities
//!
//! A child block links to its parent when heights are consecutive, the
//! previous-block hash matches the parent's entity hash, and timestamps
//! strictly increase.
//!
//! The pairwise block score rewards difficulty and penalizes slow blocks:
//! `difficulty - seconds_since_parent`, saturating at zero. A chain's
//! partial score relative to an ancestor is the sum of pairwise scores.

use shared_types::{Block, BlockElement, ChainScore};

/// Whether `child` is a valid successor of `parent`.
pub fn is_chain_link(parent: &BlockElement, child: &Block) -> bool {
    parent.block.height + 1 == child.height
        && child.previous_block_hash == parent.entity_hash
        && child.timestamp > parent.block.timestamp
}

/// Score contribution of one block relative to its parent's timestamp.
pub fn block_score(parent_timestamp: u64, block: &Block) -> ChainScore {
    let elapsed_seconds = block.timestamp.saturating_sub(parent_timestamp) / 1_000;
    ChainScore::new(block.difficulty.saturating_sub(elapsed_seconds))
}

/// Cumulative score of `blocks` relative to `parent`.
///
/// Blocks must be in ascending height order; an empty slice scores zero.
pub fn calculate_partial_chain_score<'a>(
    parent: &Block,
    blocks: impl IntoIterator<Item = &'a Block>,
) -> ChainScore {
    let mut score = ChainScore::default();
    let mut parent_timestamp = parent.timestamp;
    for block in blocks {
        score += block_score(parent_timestamp, block);
        parent_timestamp = block.timestamp;
    }
    score
}
