//! # Block Storage Service
//!
//! `BlockStorage` fronts a raw [`BlockStore`] with reader/writer
//! discipline and staged replacement:
//!
//! - `view()` - shared read snapshot; many may be live at once.
//! - `modifier()` - the single exclusive writer. It records
//!   `drop_blocks_after` and `save_blocks` in memory and applies them to
//!   the backing store only on `commit()`, so a concurrent view can never
//!   observe a transiently-truncated chain with partially-applied blocks.
//!
//! Acquiring the modifier blocks until every view releases; holding the
//! write lock for the whole replace sequence is what makes the
//! truncate+append atomic from a reader's perspective.
//!
//! A modifier dropped without `commit()` leaves the store untouched.

use crate::adapters::MemoryBlockStore;
use crate::domain::errors::BlockStorageError;
use crate::ports::outbound::BlockStore;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use shared_types::{Block, BlockElement, Hash, GENESIS_HEIGHT};

/// Reader/writer front over a raw block store.
pub struct BlockStorage {
    store: RwLock<Box<dyn BlockStore>>,
}

impl BlockStorage {
    /// Wrap a raw store.
    pub fn new(store: impl BlockStore + 'static) -> Self {
        Self {
            store: RwLock::new(Box::new(store)),
        }
    }

    /// Convenience constructor backed by [`MemoryBlockStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryBlockStore::new())
    }

    /// Acquire a read-only snapshot.
    pub fn view(&self) -> BlockStorageView<'_> {
        BlockStorageView {
            guard: self.store.read(),
        }
    }

    /// Acquire the exclusive writer. Blocks until all views release.
    pub fn modifier(&self) -> BlockStorageModifier<'_> {
        BlockStorageModifier {
            guard: self.store.write(),
            drop_to: None,
            staged: Vec::new(),
        }
    }
}

/// Read-only snapshot of the stored chain.
pub struct BlockStorageView<'a> {
    guard: RwLockReadGuard<'a, Box<dyn BlockStore>>,
}

impl BlockStorageView<'_> {
    /// Height of the highest stored block; 0 when empty.
    pub fn chain_height(&self) -> u64 {
        self.guard.chain_height()
    }

    /// Load the block stored at `height`.
    pub fn load_block(&self, height: u64) -> Result<Block, BlockStorageError> {
        Ok(self.guard.load(height)?.block)
    }

    /// Load the full element stored at `height`.
    pub fn load_block_element(&self, height: u64) -> Result<BlockElement, BlockStorageError> {
        self.guard.load(height)
    }

    /// Load up to `max_count` block entity hashes starting at `height`.
    pub fn load_hashes_from(
        &self,
        height: u64,
        max_count: usize,
    ) -> Result<Vec<Hash>, BlockStorageError> {
        let chain_height = self.chain_height();
        if height == 0 || height > chain_height {
            return Err(BlockStorageError::HeightNotFound {
                height,
                chain_height,
            });
        }
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let end = chain_height.min(height + max_count as u64 - 1);
        let mut hashes = Vec::with_capacity((end - height + 1) as usize);
        for h in height..=end {
            hashes.push(self.guard.load(h)?.entity_hash);
        }
        Ok(hashes)
    }
}

/// Exclusive staged writer.
///
/// Call order: at most one `drop_blocks_after`, then saves, then `commit`.
pub struct BlockStorageModifier<'a> {
    guard: RwLockWriteGuard<'a, Box<dyn BlockStore>>,
    drop_to: Option<u64>,
    staged: Vec<BlockElement>,
}

impl BlockStorageModifier<'_> {
    fn staged_tip(&self) -> u64 {
        let base = self.drop_to.unwrap_or_else(|| self.guard.chain_height());
        base + self.staged.len() as u64
    }

    /// Stage the removal of every block above `height`.
    pub fn drop_blocks_after(&mut self, height: u64) -> Result<(), BlockStorageError> {
        if height < GENESIS_HEIGHT {
            return Err(BlockStorageError::GenesisUntouchable { height });
        }

        self.drop_to = Some(height.min(self.guard.chain_height()));
        Ok(())
    }

    /// Stage a single block append at the staged tip + 1.
    pub fn save_block(&mut self, element: BlockElement) -> Result<(), BlockStorageError> {
        let expected = self.staged_tip() + 1;
        if element.block.height != expected {
            return Err(BlockStorageError::UnexpectedHeight {
                expected,
                actual: element.block.height,
            });
        }

        self.staged.push(element);
        Ok(())
    }

    /// Stage a contiguous run of block appends.
    pub fn save_blocks(
        &mut self,
        elements: impl IntoIterator<Item = BlockElement>,
    ) -> Result<(), BlockStorageError> {
        for element in elements {
            self.save_block(element)?;
        }
        Ok(())
    }

    /// Apply the staged truncation and appends to the backing store.
    pub fn commit(mut self) -> Result<(), BlockStorageError> {
        if let Some(height) = self.drop_to {
            tracing::debug!(height, "dropping blocks after height");
            self.guard.drop_after(height)?;
        }

        let new_tip = self.staged.last().map(|e| e.block.height);
        for element in self.staged.drain(..) {
            self.guard.save(&element)?;
        }

        if let Some(height) = new_tip {
            tracing::debug!(height, "block storage committed");
        }
        Ok(())
    }
}
