//! # Storage Errors
//!
//! Each variant corresponds to a specific invariant violation or failure
//! mode. No panics in domain logic.

use thiserror::Error;

/// Errors from block storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockStorageError {
    /// A load was requested beyond the current chain height.
    #[error("no block at height {height} (chain height {chain_height})")]
    HeightNotFound {
        /// The requested height.
        height: u64,
        /// The chain height at the time of the request.
        chain_height: u64,
    },

    /// A save would break height contiguity.
    #[error("unexpected save height {actual}, expected {expected}")]
    UnexpectedHeight {
        /// Height the store expected next.
        expected: u64,
        /// Height actually supplied.
        actual: u64,
    },

    /// A truncation would remove the genesis block.
    #[error("cannot drop blocks at or below genesis (requested height {height})")]
    GenesisUntouchable {
        /// The requested truncation height.
        height: u64,
    },

    /// Underlying I/O failure. Fatal; callers do not retry in place.
    #[error("storage I/O error: {message}")]
    Io {
        /// Failure description.
        message: String,
    },

    /// Encoding/decoding failure for a persisted block.
    #[error("block serialization error: {message}")]
    Serialization {
        /// Failure description.
        message: String,
    },
}

impl From<std::io::Error> for BlockStorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<bincode::Error> for BlockStorageError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
