//! # In-Memory Block Store
//!
//! BTreeMap-backed adapter for tests and single-process deployments.

use crate::domain::errors::BlockStorageError;
use crate::ports::outbound::BlockStore;
use shared_types::{BlockElement, GENESIS_HEIGHT};
use std::collections::BTreeMap;

/// In-memory height-indexed block store.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: BTreeMap<u64, BlockElement>,
}

impl MemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the store holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockStore for MemoryBlockStore {
    fn chain_height(&self) -> u64 {
        self.blocks.keys().next_back().copied().unwrap_or(0)
    }

    fn load(&self, height: u64) -> Result<BlockElement, BlockStorageError> {
        self.blocks
            .get(&height)
            .cloned()
            .ok_or(BlockStorageError::HeightNotFound {
                height,
                chain_height: self.chain_height(),
            })
    }

    fn save(&mut self, element: &BlockElement) -> Result<(), BlockStorageError> {
        let expected = self.chain_height() + 1;
        if element.block.height != expected {
            return Err(BlockStorageError::UnexpectedHeight {
                expected,
                actual: element.block.height,
            });
        }

        self.blocks.insert(element.block.height, element.clone());
        Ok(())
    }

    fn drop_after(&mut self, height: u64) -> Result<(), BlockStorageError> {
        if height < GENESIS_HEIGHT {
            return Err(BlockStorageError::GenesisUntouchable { height });
        }

        self.blocks.split_off(&(height + 1));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Block;

    fn element_at(height: u64) -> BlockElement {
        BlockElement::from_block(Block {
            height,
            timestamp: height * 1_000,
            difficulty: 100,
            signer: [height as u8; 32],
            signature: [0; 64],
            previous_block_hash: [0; 32],
            transactions: vec![],
        })
    }

    fn seeded(height: u64) -> MemoryBlockStore {
        let mut store = MemoryBlockStore::new();
        for h in 1..=height {
            store.save(&element_at(h)).unwrap();
        }
        store
    }

    #[test]
    fn test_empty_store_has_height_zero() {
        assert_eq!(MemoryBlockStore::new().chain_height(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let store = seeded(3);
        assert_eq!(store.chain_height(), 3);
        assert_eq!(store.load(2).unwrap().block.height, 2);
    }

    #[test]
    fn test_load_beyond_height_fails() {
        let store = seeded(3);
        let err = store.load(4).unwrap_err();
        assert_eq!(
            err,
            BlockStorageError::HeightNotFound {
                height: 4,
                chain_height: 3
            }
        );
    }

    #[test]
    fn test_save_with_gap_fails() {
        let mut store = seeded(3);
        let err = store.save(&element_at(5)).unwrap_err();
        assert_eq!(
            err,
            BlockStorageError::UnexpectedHeight {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn test_drop_after_truncates() {
        let mut store = seeded(5);
        store.drop_after(2).unwrap();
        assert_eq!(store.chain_height(), 2);
        assert!(store.load(3).is_err());
    }

    #[test]
    fn test_drop_after_protects_genesis() {
        let mut store = seeded(5);
        let err = store.drop_after(0).unwrap_err();
        assert_eq!(err, BlockStorageError::GenesisUntouchable { height: 0 });
    }
}
