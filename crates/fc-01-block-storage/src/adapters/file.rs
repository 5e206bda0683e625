//! # File Block Store
//!
//! One bincode-encoded file per height under a data directory, e.g.
//! `00000001.blk` for genesis. Writes go to a temp file first and are
//! renamed into place so a crash never leaves a half-written block behind.
//!
//! The contiguous height range is scanned once at open; afterwards the
//! height is tracked in memory.

use crate::domain::errors::BlockStorageError;
use crate::ports::outbound::BlockStore;
use shared_types::{BlockElement, GENESIS_HEIGHT};
use std::fs;
use std::path::{Path, PathBuf};

const BLOCK_EXTENSION: &str = "blk";

/// File-per-height block store.
#[derive(Debug)]
pub struct FileBlockStore {
    dir: PathBuf,
    height: u64,
}

impl FileBlockStore {
    /// Open (creating the directory if needed) and scan the stored height.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, BlockStorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut height = 0;
        while Self::block_path(&dir, height + 1).exists() {
            height += 1;
        }

        tracing::debug!(dir = %dir.display(), height, "opened file block store");
        Ok(Self { dir, height })
    }

    fn block_path(dir: &Path, height: u64) -> PathBuf {
        dir.join(format!("{height:08}.{BLOCK_EXTENSION}"))
    }

    fn write_atomically(&self, height: u64, bytes: &[u8]) -> Result<(), BlockStorageError> {
        let tmp = self.dir.join(format!("{height:08}.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, Self::block_path(&self.dir, height))?;
        Ok(())
    }
}

impl BlockStore for FileBlockStore {
    fn chain_height(&self) -> u64 {
        self.height
    }

    fn load(&self, height: u64) -> Result<BlockElement, BlockStorageError> {
        if height == 0 || height > self.height {
            return Err(BlockStorageError::HeightNotFound {
                height,
                chain_height: self.height,
            });
        }

        let bytes = fs::read(Self::block_path(&self.dir, height))?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn save(&mut self, element: &BlockElement) -> Result<(), BlockStorageError> {
        let expected = self.height + 1;
        if element.block.height != expected {
            return Err(BlockStorageError::UnexpectedHeight {
                expected,
                actual: element.block.height,
            });
        }

        let bytes = bincode::serialize(element)?;
        self.write_atomically(element.block.height, &bytes)?;
        self.height = element.block.height;
        Ok(())
    }

    fn drop_after(&mut self, height: u64) -> Result<(), BlockStorageError> {
        if height < GENESIS_HEIGHT {
            return Err(BlockStorageError::GenesisUntouchable { height });
        }

        while self.height > height {
            let path = Self::block_path(&self.dir, self.height);
            if path.exists() {
                fs::remove_file(&path)?;
            }
            self.height -= 1;
        }
        Ok(())
    }
}
