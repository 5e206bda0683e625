//! # Sync Error Taxonomy
//!
//! Two tiers, deliberately kept apart:
//!
//! - [`SyncRejection`] - expected, recoverable input rejections. Returned
//!   as a value; the upstream dispatcher discards the batch and moves on.
//!   A rejected batch leaves chain height, score and state untouched.
//! - [`SyncError`] - unexpected, fatal failures (storage I/O, cache
//!   commit, checkpoint write). Propagated with `?`; the process-level
//!   recovery path inspects the commit marker afterwards.

use fc_01_block_storage::BlockStorageError;
use fc_02_state_cache::StateCacheError;
use shared_types::ChainScore;
use thiserror::Error;

/// Why batch validation/execution failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// A candidate does not link to its predecessor.
    #[error("block at height {height} does not link to its parent")]
    BrokenLink {
        /// Offending candidate height.
        height: u64,
    },

    /// The signer was not eligible to produce the block.
    #[error("block at height {height} is not hit by its signer")]
    BlockNotHit {
        /// Offending candidate height.
        height: u64,
    },

    /// Transaction execution failed.
    #[error("execution failed at height {height}: {message}")]
    ExecutionFailure {
        /// Offending candidate height.
        height: u64,
        /// Failure description.
        message: String,
    },
}

/// Outcome of batch validation/execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Batch fully validated and executed.
    Success,
    /// Batch is neither valid nor provably invalid; treated as rejection.
    Neutral,
    /// Batch failed validation or execution.
    Failure(ValidationFailure),
}

impl ValidationResult {
    /// Whether the result is `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success)
    }
}

/// Expected input rejections. No durable mutation occurs for any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncRejection {
    /// The candidate batch contained no blocks.
    #[error("empty candidate batch")]
    EmptyInput,

    /// The candidate chain cannot be linked to the local chain.
    #[error("candidate chain is unlinked (start height {peer_start_height}, local height {local_height})")]
    Unlinked {
        /// First candidate block height.
        peer_start_height: u64,
        /// Local chain height.
        local_height: u64,
    },

    /// The implied rollback exceeds the configured maximum.
    #[error("candidate chain is too far behind (rollback depth {rollback_depth}, max {max_rollback})")]
    TooFarBehind {
        /// Number of local blocks that would be rolled back.
        rollback_depth: u64,
        /// Configured maximum rollback depth.
        max_rollback: u64,
    },

    /// An embedded network-configuration transaction failed to decode.
    #[error("malformed network-configuration payload at height {height}")]
    NetworkConfigMalformed {
        /// Height of the block carrying the malformed payload.
        height: u64,
    },

    /// A candidate's declared difficulty disagrees with the recomputed one.
    #[error("mismatched difficulty at candidate index {index}")]
    MismatchedDifficulties {
        /// Index of the first mismatching candidate.
        index: usize,
    },

    /// Two transactions in the batch share an entity hash.
    #[error("duplicate transactions within candidate batch")]
    DuplicateTransactions,

    /// The candidate chain does not strictly improve on the local score.
    /// Ties are rejected to prevent oscillation between equal chains.
    #[error("candidate score {peer_score} does not beat local score {local_score}")]
    ScoreNotBetter {
        /// Candidate partial score.
        peer_score: ChainScore,
        /// Local partial score over the unwound range.
        local_score: ChainScore,
    },

    /// The batch processor returned `Neutral`.
    #[error("batch processing returned neutral")]
    ValidationNeutral,

    /// The batch processor returned a failure.
    #[error("batch processing failed: {0}")]
    ValidationFailed(#[source] ValidationFailure),
}

/// Fatal failures. The engine never retries these in place.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Block storage failure.
    #[error(transparent)]
    Storage(#[from] BlockStorageError),

    /// State cache failure.
    #[error(transparent)]
    StateCache(#[from] StateCacheError),

    /// Commit checkpoint marker could not be persisted.
    #[error("checkpoint marker write failed: {message}")]
    Checkpoint {
        /// Failure description.
        message: String,
    },

    /// A locally stored block could not be interpreted during unwind.
    #[error("locally stored block at height {height} is malformed")]
    MalformedLocalBlock {
        /// Offending stored height.
        height: u64,
    },

    /// Undoing a committed block failed.
    #[error("undo failed at height {height}: {message}")]
    UndoFailed {
        /// Height being undone.
        height: u64,
        /// Failure description.
        message: String,
    },

    /// A downstream state-change subscriber failed.
    #[error("state change subscriber failed: {message}")]
    Subscriber {
        /// Failure description.
        message: String,
    },
}
