//! # Outbound Ports
//!
//! Collaborators the sync engine drives but does not own: difficulty
//! verification, block undo, batch execution, and the observers fired
//! during the ordered commit. Production wiring lives in the processor
//! module; tests inject capture mocks through [`SyncHandlers`].

use std::collections::BTreeSet;
use std::sync::Arc;

use fc_02_state_cache::{CacheChanges, ReadOnlyState, StateCacheDelta};
use shared_types::{BlockElement, ChainScore, TransactionInfo};

use crate::checkpoint::{CommitStepObserver, NoopCommitStepWriter};
use crate::config::ConfigHolder;
use crate::domain::errors::{SyncError, ValidationResult};
use crate::domain::unwind::UndoMode;
use crate::score::ChainScoreHolder;

/// Payload delivered to [`StateChangeObserver`] when a chain is adopted.
#[derive(Debug, Clone)]
pub struct StateChangeInfo {
    /// Summary of cache mutations the delta accumulated.
    pub cache_changes: CacheChanges,
    /// Net score change versus the abandoned segment.
    pub score_delta: ChainScore,
    /// New chain height.
    pub height: u64,
}

/// Verifies candidate difficulties against recomputed expectations.
pub trait DifficultyChecker: Send + Sync {
    /// Index of the first candidate whose declared difficulty disagrees
    /// with the recomputed value, if any.
    fn first_mismatch(
        &self,
        state: &ReadOnlyState,
        elements: &[BlockElement],
        configs: &ConfigHolder,
        config_heights: &BTreeSet<u64>,
    ) -> Option<usize>;
}

/// Reverses a committed block's effects on the state delta.
pub trait UndoBlockObserver: Send + Sync {
    fn undo_block(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
        mode: UndoMode,
    ) -> Result<(), SyncError>;
}

/// Validates and executes a candidate batch against the state delta.
pub trait BatchProcessor: Send + Sync {
    /// Process `elements`, which attach to `common`. Implementations
    /// derive each element's generation hash in place before validating.
    fn process(
        &self,
        common: &BlockElement,
        elements: &mut [BlockElement],
        delta: &StateCacheDelta,
    ) -> Result<ValidationResult, SyncError>;
}

/// Observes the adoption of a new chain segment.
pub trait StateChangeObserver: Send + Sync {
    fn on_state_change(&self, info: &StateChangeInfo) -> Result<(), SyncError>;
}

/// Fired after the state change is announced, before cache state is
/// made durable. Supporting stores flush here.
pub trait PreStateWrittenObserver: Send + Sync {
    fn on_pre_state_written(&self) -> Result<(), SyncError>;
}

/// Observes confirmed/reverted transactions after a chain switch.
pub trait TransactionsChangeObserver: Send + Sync {
    fn on_transactions_change(
        &self,
        added: &[TransactionInfo],
        reverted: &[TransactionInfo],
    ) -> Result<(), SyncError>;
}

/// Production [`StateChangeObserver`]: the only mutator of the shared
/// chain-score holder.
#[derive(Debug)]
pub struct ScoreUpdatingObserver {
    holder: Arc<ChainScoreHolder>,
}

impl ScoreUpdatingObserver {
    pub fn new(holder: Arc<ChainScoreHolder>) -> Self {
        Self { holder }
    }
}

impl StateChangeObserver for ScoreUpdatingObserver {
    fn on_state_change(&self, info: &StateChangeInfo) -> Result<(), SyncError> {
        self.holder.add(info.score_delta);
        tracing::debug!(
            height = info.height,
            score_delta = %info.score_delta,
            "chain score advanced"
        );
        Ok(())
    }
}

/// The injected collaborator bundle driving a [`crate::service::ChainSyncService`].
pub struct SyncHandlers {
    pub difficulty_checker: Box<dyn DifficultyChecker>,
    pub undo_observer: Box<dyn UndoBlockObserver>,
    pub batch_processor: Box<dyn BatchProcessor>,
    pub state_change_observer: Box<dyn StateChangeObserver>,
    pub pre_state_written_observer: Box<dyn PreStateWrittenObserver>,
    pub commit_step_observer: Box<dyn CommitStepObserver>,
    pub transactions_change_observer: Box<dyn TransactionsChangeObserver>,
}

impl SyncHandlers {
    /// Handlers that accept everything and observe nothing. Tests start
    /// from here and override the pieces under scrutiny.
    pub fn noop() -> Self {
        Self {
            difficulty_checker: Box::new(AcceptingDifficultyChecker),
            undo_observer: Box::new(NoopUndoObserver),
            batch_processor: Box::new(AcceptingBatchProcessor),
            state_change_observer: Box::new(NoopStateChangeObserver),
            pre_state_written_observer: Box::new(NoopPreStateWrittenObserver),
            commit_step_observer: Box::new(NoopCommitStepWriter),
            transactions_change_observer: Box::new(NoopTransactionsChangeObserver),
        }
    }

    pub fn with_difficulty_checker(mut self, checker: Box<dyn DifficultyChecker>) -> Self {
        self.difficulty_checker = checker;
        self
    }

    pub fn with_undo_observer(mut self, observer: Box<dyn UndoBlockObserver>) -> Self {
        self.undo_observer = observer;
        self
    }

    pub fn with_batch_processor(mut self, processor: Box<dyn BatchProcessor>) -> Self {
        self.batch_processor = processor;
        self
    }

    pub fn with_state_change_observer(mut self, observer: Box<dyn StateChangeObserver>) -> Self {
        self.state_change_observer = observer;
        self
    }

    pub fn with_pre_state_written_observer(
        mut self,
        observer: Box<dyn PreStateWrittenObserver>,
    ) -> Self {
        self.pre_state_written_observer = observer;
        self
    }

    pub fn with_commit_step_observer(mut self, observer: Box<dyn CommitStepObserver>) -> Self {
        self.commit_step_observer = observer;
        self
    }

    pub fn with_transactions_change_observer(
        mut self,
        observer: Box<dyn TransactionsChangeObserver>,
    ) -> Self {
        self.transactions_change_observer = observer;
        self
    }
}

/// Difficulty checker that accepts every candidate.
#[derive(Debug, Default)]
pub struct AcceptingDifficultyChecker;

impl DifficultyChecker for AcceptingDifficultyChecker {
    fn first_mismatch(
        &self,
        _state: &ReadOnlyState,
        _elements: &[BlockElement],
        _configs: &ConfigHolder,
        _config_heights: &BTreeSet<u64>,
    ) -> Option<usize> {
        None
    }
}

/// Undo observer that touches nothing.
#[derive(Debug, Default)]
pub struct NoopUndoObserver;

impl UndoBlockObserver for NoopUndoObserver {
    fn undo_block(
        &self,
        _element: &BlockElement,
        _delta: &StateCacheDelta,
        _mode: UndoMode,
    ) -> Result<(), SyncError> {
        Ok(())
    }
}

/// Batch processor that validates nothing and succeeds.
#[derive(Debug, Default)]
pub struct AcceptingBatchProcessor;

impl BatchProcessor for AcceptingBatchProcessor {
    fn process(
        &self,
        _common: &BlockElement,
        _elements: &mut [BlockElement],
        _delta: &StateCacheDelta,
    ) -> Result<ValidationResult, SyncError> {
        Ok(ValidationResult::Success)
    }
}

/// State-change observer that drops the notification.
#[derive(Debug, Default)]
pub struct NoopStateChangeObserver;

impl StateChangeObserver for NoopStateChangeObserver {
    fn on_state_change(&self, _info: &StateChangeInfo) -> Result<(), SyncError> {
        Ok(())
    }
}

/// Pre-state-written observer with nothing to flush.
#[derive(Debug, Default)]
pub struct NoopPreStateWrittenObserver;

impl PreStateWrittenObserver for NoopPreStateWrittenObserver {
    fn on_pre_state_written(&self) -> Result<(), SyncError> {
        Ok(())
    }
}

/// Transactions-change observer that drops the notification.
#[derive(Debug, Default)]
pub struct NoopTransactionsChangeObserver;

impl TransactionsChangeObserver for NoopTransactionsChangeObserver {
    fn on_transactions_change(
        &self,
        _added: &[TransactionInfo],
        _reverted: &[TransactionInfo],
    ) -> Result<(), SyncError> {
        Ok(())
    }
}
