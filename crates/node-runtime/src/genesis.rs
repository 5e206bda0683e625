//! The fixed genesis block.

use fc_03_chain_sync::domain::difficulty::DEFAULT_DIFFICULTY;
use shared_types::{Block, BlockElement, GENESIS_HEIGHT};

/// Timestamp of the genesis block (milliseconds).
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000_000;

/// The genesis element every Ferrite-Chain node starts from.
///
/// Deterministic by construction: every node derives the same entity
/// hash, so chains always share a common ancestor at height 1.
pub fn genesis_element() -> BlockElement {
    BlockElement::from_block(Block {
        height: GENESIS_HEIGHT,
        timestamp: GENESIS_TIMESTAMP,
        difficulty: DEFAULT_DIFFICULTY,
        signer: [0; 32],
        signature: [0; 64],
        previous_block_hash: [0; 32],
        transactions: vec![],
    })
}
