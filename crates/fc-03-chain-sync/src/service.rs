//! # Chain Synchronization Engine
//!
//! One `synchronize` attempt runs the full pipeline: preprocessing
//! (link, rollback-depth, config, duplicate and difficulty checks),
//! unwind to the common ancestor against a fresh state delta, score
//! comparison, configuration-boundary truncation, batch processing, and
//! the ordered commit. Rejections return as values and leave no durable
//! mutation; fatal failures propagate after the checkpoint marker has
//! recorded the last completed commit step.
//!
//! Lock discipline: the storage view is released before the exclusive
//! modifier is acquired, and the state delta is held for the remainder
//! of the attempt once created.

use std::collections::HashSet;
use std::sync::Arc;

use shared_types::{
    extract_transaction_hashes, extract_transaction_infos, BlockElement, TransactionInfo,
    GENESIS_HEIGHT,
};

use crate::checkpoint::{CommitOperationStep, CommitStepObserver};
use crate::domain::errors::{SyncError, SyncRejection, ValidationResult};
use crate::domain::link::{block_score, calculate_partial_chain_score};
use crate::domain::netconfig::extract_config_heights;
use crate::domain::sync_state::SyncState;
use crate::domain::unwind::{UndoMode, UnwindResult};
use crate::ports::inbound::{ChainSynchronizer, InputSource, SyncOutcome};
use crate::ports::outbound::{ScoreUpdatingObserver, StateChangeInfo, SyncHandlers};
use crate::processor::{BlockChainProcessor, ObserverAggregate, RollingDifficultyChecker};
use crate::reconcile::collect_reverted_transaction_infos;
use crate::state::LocalChainState;

/// The default [`ChainSynchronizer`].
pub struct ChainSyncService {
    state: LocalChainState,
    handlers: SyncHandlers,
}

impl ChainSyncService {
    pub fn new(state: LocalChainState, handlers: SyncHandlers) -> Self {
        Self { state, handlers }
    }

    /// Production wiring: rolling difficulty checks, the standard
    /// observer chain for execution and undo, score updates through the
    /// shared holder, and the supplied commit-step sink.
    pub fn standard(
        state: LocalChainState,
        commit_step_observer: Box<dyn CommitStepObserver>,
    ) -> Self {
        let handlers = SyncHandlers::noop()
            .with_difficulty_checker(Box::new(RollingDifficultyChecker))
            .with_undo_observer(Box::new(ObserverAggregate::standard()))
            .with_batch_processor(Box::new(BlockChainProcessor::standard()))
            .with_state_change_observer(Box::new(ScoreUpdatingObserver::new(Arc::clone(
                &state.score,
            ))))
            .with_commit_step_observer(commit_step_observer);
        Self::new(state, handlers)
    }

    fn reject(&self, rejection: SyncRejection) -> Result<SyncOutcome, SyncError> {
        tracing::warn!(%rejection, "candidate chain rejected");
        Ok(SyncOutcome::Aborted(rejection))
    }
}

impl ChainSynchronizer for ChainSyncService {
    fn synchronize(
        &self,
        elements: &mut Vec<BlockElement>,
        source: InputSource,
    ) -> Result<SyncOutcome, SyncError> {
        if elements.is_empty() {
            return self.reject(SyncRejection::EmptyInput);
        }
        tracing::debug!(
            blocks = elements.len(),
            start_height = elements[0].block.height,
            ?source,
            "synchronization attempt"
        );

        // Preprocessing under a storage view; the view must release
        // before the commit phase takes the exclusive modifier.
        let peer_start_height = elements[0].block.height;
        let common_height = peer_start_height.saturating_sub(1);
        let (common, local_elements, remote_config_heights) = {
            let view = self.state.storage.view();
            let local_height = view.chain_height();

            // Non-pull sources may extend the chain or replace exactly
            // the tip; forking below the tip requires an active pull.
            let forks_below_tip = peer_start_height < local_height;
            if peer_start_height <= GENESIS_HEIGHT
                || peer_start_height > local_height + 1
                || (forks_below_tip && !source.allows_rollback())
            {
                return self.reject(SyncRejection::Unlinked {
                    peer_start_height,
                    local_height,
                });
            }

            let rollback_depth = local_height.saturating_sub(peer_start_height);
            let max_rollback = self.state.configs.config_at(local_height).max_rollback_blocks;
            if rollback_depth > 0 && rollback_depth > max_rollback {
                return self.reject(SyncRejection::TooFarBehind {
                    rollback_depth,
                    max_rollback,
                });
            }

            let remote_config_heights = match extract_config_heights(elements) {
                Ok(heights) => heights,
                Err(height) => {
                    return self.reject(SyncRejection::NetworkConfigMalformed { height })
                }
            };

            let mut seen = HashSet::new();
            for element in elements.iter() {
                for hash in &element.transaction_hashes {
                    if !seen.insert(*hash) {
                        return self.reject(SyncRejection::DuplicateTransactions);
                    }
                }
            }

            if let Some(index) = self.handlers.difficulty_checker.first_mismatch(
                &self.state.cache.read(),
                elements,
                &self.state.configs,
                &remote_config_heights,
            ) {
                return self.reject(SyncRejection::MismatchedDifficulties { index });
            }

            let common = view.load_block_element(common_height)?;
            let local_elements = (common_height + 1..=local_height)
                .map(|height| view.load_block_element(height))
                .collect::<Result<Vec<_>, _>>()?;
            (common, local_elements, remote_config_heights)
        };

        // Unwind to the common ancestor against a dedicated delta.
        let delta = self.state.cache.create_delta()?;
        let mut sync_state = SyncState::new(common);
        let mut unwind = UnwindResult::default();
        if !local_elements.is_empty() {
            for element in local_elements.iter().rev() {
                self.handlers
                    .undo_observer
                    .undo_block(element, &delta, UndoMode::Rollback)?;
                extract_transaction_infos(&mut unwind.transaction_infos, element);
            }
            self.handlers.undo_observer.undo_block(
                &sync_state.common,
                &delta,
                UndoMode::Common,
            )?;
        }
        unwind.score = calculate_partial_chain_score(
            &sync_state.common.block,
            local_elements.iter().map(|element| &element.block),
        );
        unwind.config_heights = extract_config_heights(&local_elements)
            .map_err(|height| SyncError::MalformedLocalBlock { height })?;

        sync_state.local_score = unwind.score;
        sync_state.push_removed_transaction_infos(unwind.transaction_infos);

        sync_state.peer_score = calculate_partial_chain_score(
            &sync_state.common.block,
            elements.iter().map(|element| &element.block),
        );
        if sync_state.peer_score <= sync_state.local_score {
            return self.reject(SyncRejection::ScoreNotBetter {
                peer_score: sync_state.peer_score,
                local_score: sync_state.local_score,
            });
        }

        // A config boundary inside the candidate range that the unwind
        // did not already account for cuts the batch short of it.
        let last_height = elements[elements.len() - 1].block.height;
        let boundary = remote_config_heights
            .iter()
            .copied()
            .find(|height| {
                *height > peer_start_height
                    && *height <= last_height
                    && !unwind.config_heights.contains(height)
            });
        if let Some(boundary) = boundary {
            while elements
                .last()
                .is_some_and(|element| element.block.height >= boundary)
            {
                if let Some(dropped) = elements.pop() {
                    let parent_timestamp = elements
                        .last()
                        .map(|element| element.block.timestamp)
                        .unwrap_or(sync_state.common.block.timestamp);
                    sync_state.peer_score -= block_score(parent_timestamp, &dropped.block);
                }
            }
            tracing::debug!(boundary, remaining = elements.len(), "candidate batch truncated at config boundary");

            if elements.is_empty() || sync_state.peer_score <= sync_state.local_score {
                return self.reject(SyncRejection::ScoreNotBetter {
                    peer_score: sync_state.peer_score,
                    local_score: sync_state.local_score,
                });
            }
        }

        // Processing: any non-success drops the delta untouched.
        match self
            .handlers
            .batch_processor
            .process(&sync_state.common, elements, &delta)?
        {
            ValidationResult::Success => {}
            ValidationResult::Neutral => return self.reject(SyncRejection::ValidationNeutral),
            ValidationResult::Failure(failure) => {
                return self.reject(SyncRejection::ValidationFailed(failure))
            }
        }

        // Ordered commit.
        let new_height = match elements.last() {
            Some(element) => element.block.height,
            None => return self.reject(SyncRejection::EmptyInput),
        };
        let score_delta = sync_state.score_delta();

        let mut modifier = self.state.storage.modifier();
        modifier.drop_blocks_after(sync_state.common.block.height)?;
        modifier.save_blocks(elements.iter().cloned())?;
        self.handlers
            .commit_step_observer
            .on_step(CommitOperationStep::BlocksWritten)?;

        self.handlers
            .state_change_observer
            .on_state_change(&StateChangeInfo {
                cache_changes: delta.changes(),
                score_delta,
                height: new_height,
            })?;
        self.handlers
            .pre_state_written_observer
            .on_pre_state_written()?;
        self.handlers
            .commit_step_observer
            .on_step(CommitOperationStep::StateWritten)?;

        modifier.commit()?;
        delta.commit(new_height)?;
        self.handlers
            .commit_step_observer
            .on_step(CommitOperationStep::AllUpdated)?;

        let added_hashes = extract_transaction_hashes(elements);
        let reverted = collect_reverted_transaction_infos(
            &added_hashes,
            sync_state.detach_removed_transaction_infos(),
        );
        let mut added_infos: Vec<TransactionInfo> = Vec::new();
        for element in elements.iter() {
            extract_transaction_infos(&mut added_infos, element);
        }
        self.handlers
            .transactions_change_observer
            .on_transactions_change(&added_infos, &reverted)?;

        tracing::info!(height = new_height, %score_delta, "chain synchronized");
        Ok(SyncOutcome::Continue {
            height: new_height,
            score_delta,
        })
    }
}
