//! # Outbound Ports
//!
//! The raw store behind [`crate::BlockStorage`]. Adapters implement plain
//! height-indexed persistence; contiguity validation lives here so every
//! adapter enforces the same discipline. Locking and staging are the
//! service front's job, not the adapter's.

use crate::domain::errors::BlockStorageError;
use shared_types::BlockElement;

/// Raw height-indexed block store.
pub trait BlockStore: Send + Sync {
    /// Height of the highest stored block; 0 when empty.
    fn chain_height(&self) -> u64;

    /// Load the element stored at `height`.
    fn load(&self, height: u64) -> Result<BlockElement, BlockStorageError>;

    /// Store `element` at `element.block.height`, which must be exactly
    /// `chain_height() + 1`.
    fn save(&mut self, element: &BlockElement) -> Result<(), BlockStorageError>;

    /// Remove every block with height greater than `height`. `height` must
    /// be at least the genesis height.
    fn drop_after(&mut self, height: u64) -> Result<(), BlockStorageError>;
}
