//! # Batch Processor
//!
//! The default [`BatchProcessor`]: walks a candidate batch in order,
//! verifying that each block links to its predecessor, deriving its
//! generation hash, checking consensus eligibility, and executing its
//! transactions through an ordered observer chain against the state
//! delta. The same observer chain reversed serves as the undo path for
//! unwound blocks.

use std::collections::BTreeSet;

use sha3::{Digest, Sha3_256};

use fc_02_state_cache::{DifficultyInfo, ReadOnlyState, StateCacheDelta};
use shared_types::{BlockElement, Hash, PublicKey, TransactionPayload};

use crate::config::ConfigHolder;
use crate::domain::difficulty::calculate_difficulty;
use crate::domain::errors::{SyncError, ValidationFailure, ValidationResult};
use crate::domain::link::is_chain_link;
use crate::domain::unwind::UndoMode;
use crate::ports::outbound::{BatchProcessor, DifficultyChecker, UndoBlockObserver};

/// Next generation hash: sha3-256(parent generation hash ‖ signer).
pub fn derive_generation_hash(parent_generation_hash: &Hash, signer: &PublicKey) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(parent_generation_hash);
    hasher.update(signer);
    hasher.finalize().into()
}

/// Inputs to the consensus eligibility decision for one block.
#[derive(Debug)]
pub struct BlockHitContext<'a> {
    /// The block's derived generation hash.
    pub generation_hash: &'a Hash,
    /// Effective balance of the block signer at execution time.
    pub signer_effective_balance: u64,
    /// Milliseconds since the parent block.
    pub elapsed_millis: u64,
    /// The block's declared difficulty.
    pub difficulty: u64,
}

/// Decides whether a signer was eligible to produce a block.
pub trait BlockHitPredicate: Send + Sync {
    fn is_hit(&self, context: &BlockHitContext<'_>) -> bool;
}

/// Scale factor applied to the stake-time product in the hit comparison.
const HIT_SCALE: u128 = 1 << 20;

/// Default eligibility rule: the hit value drawn from the generation
/// hash, weighted by difficulty, must fall under the signer's scaled
/// stake-time product. Zero effective balance can never hit.
#[derive(Debug, Default)]
pub struct EffectiveBalanceHitPredicate;

impl BlockHitPredicate for EffectiveBalanceHitPredicate {
    fn is_hit(&self, context: &BlockHitContext<'_>) -> bool {
        if context.signer_effective_balance == 0 {
            return false;
        }
        let hit = u64::from_be_bytes(
            context.generation_hash[..8]
                .try_into()
                .unwrap_or([u8::MAX; 8]),
        );
        let weighted_hit = u128::from(hit) * u128::from(context.difficulty.max(1));
        let target = u128::from(context.signer_effective_balance)
            * u128::from(context.elapsed_millis)
            * HIT_SCALE;
        weighted_hit < target
    }
}

/// Predicate that accepts every block. Used where eligibility is vouched
/// for upstream.
#[derive(Debug, Default)]
pub struct AlwaysHitPredicate;

impl BlockHitPredicate for AlwaysHitPredicate {
    fn is_hit(&self, _context: &BlockHitContext<'_>) -> bool {
        true
    }
}

/// One facet of block execution: applies a block's effects to the delta
/// and knows how to reverse them.
pub trait NotificationObserver: Send + Sync {
    /// Observer name, for logging.
    fn name(&self) -> &'static str;

    /// Apply the block's effects.
    fn execute(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
    ) -> Result<(), ValidationFailure>;

    /// Reverse the block's effects.
    fn undo(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
        mode: UndoMode,
    ) -> Result<(), SyncError>;
}

/// Moves balances for transfer transactions; fees are debited from the
/// sender and burned.
#[derive(Debug, Default)]
pub struct BalanceTransferObserver;

impl BalanceTransferObserver {
    fn apply(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
    ) -> Result<(), fc_02_state_cache::StateCacheError> {
        for transaction in &element.block.transactions {
            delta.debit(transaction.signer, transaction.fee)?;
            if let TransactionPayload::Transfer { recipient, amount } = transaction.payload {
                delta.debit(transaction.signer, amount)?;
                delta.credit(recipient, amount);
            }
        }
        Ok(())
    }

    fn revert(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
    ) -> Result<(), fc_02_state_cache::StateCacheError> {
        // Reverse transaction order within the block.
        for transaction in element.block.transactions.iter().rev() {
            if let TransactionPayload::Transfer { recipient, amount } = transaction.payload {
                delta.debit(recipient, amount)?;
                delta.credit(transaction.signer, amount);
            }
            delta.credit(transaction.signer, transaction.fee);
        }
        Ok(())
    }
}

impl NotificationObserver for BalanceTransferObserver {
    fn name(&self) -> &'static str {
        "balance-transfer"
    }

    fn execute(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
    ) -> Result<(), ValidationFailure> {
        self.apply(element, delta)
            .map_err(|err| ValidationFailure::ExecutionFailure {
                height: element.block.height,
                message: err.to_string(),
            })
    }

    fn undo(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
        mode: UndoMode,
    ) -> Result<(), SyncError> {
        // The fork point keeps its balances; only departing blocks move funds back.
        if mode == UndoMode::Common {
            return Ok(());
        }
        self.revert(element, delta)
            .map_err(|err| SyncError::UndoFailed {
                height: element.block.height,
                message: err.to_string(),
            })
    }
}

/// Maintains the per-block difficulty history in the cache.
#[derive(Debug, Default)]
pub struct DifficultyHistoryObserver;

impl NotificationObserver for DifficultyHistoryObserver {
    fn name(&self) -> &'static str {
        "difficulty-history"
    }

    fn execute(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
    ) -> Result<(), ValidationFailure> {
        delta.insert_difficulty(DifficultyInfo {
            height: element.block.height,
            timestamp: element.block.timestamp,
            difficulty: element.block.difficulty,
        });
        Ok(())
    }

    fn undo(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
        mode: UndoMode,
    ) -> Result<(), SyncError> {
        match mode {
            UndoMode::Rollback => delta.remove_difficulty(element.block.height),
            // The fork point stays the tip; its history entry must remain.
            UndoMode::Common => delta.insert_difficulty(DifficultyInfo {
                height: element.block.height,
                timestamp: element.block.timestamp,
                difficulty: element.block.difficulty,
            }),
        }
        Ok(())
    }
}

/// Ordered observer chain: executes in order, undoes in reverse.
pub struct ObserverAggregate {
    observers: Vec<Box<dyn NotificationObserver>>,
}

impl ObserverAggregate {
    pub fn new(observers: Vec<Box<dyn NotificationObserver>>) -> Self {
        Self { observers }
    }

    /// The production chain: balance transfers, then difficulty history.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(BalanceTransferObserver),
            Box::new(DifficultyHistoryObserver),
        ])
    }

    /// Apply `element` through every observer, in order.
    pub fn execute(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
    ) -> Result<(), ValidationFailure> {
        for observer in &self.observers {
            observer.execute(element, delta).map_err(|failure| {
                tracing::warn!(
                    observer = observer.name(),
                    height = element.block.height,
                    %failure,
                    "block execution failed"
                );
                failure
            })?;
        }
        Ok(())
    }
}

impl UndoBlockObserver for ObserverAggregate {
    fn undo_block(
        &self,
        element: &BlockElement,
        delta: &StateCacheDelta,
        mode: UndoMode,
    ) -> Result<(), SyncError> {
        for observer in self.observers.iter().rev() {
            observer.undo(element, delta, mode)?;
        }
        Ok(())
    }
}

/// Default [`DifficultyChecker`]: recomputes the expected difficulty for
/// each candidate from a rolling history window seeded from the cache.
/// A network-config boundary inside the batch resets the window, so the
/// blocks after it are measured against the new configuration from a
/// fresh history.
#[derive(Debug, Default)]
pub struct RollingDifficultyChecker;

impl DifficultyChecker for RollingDifficultyChecker {
    fn first_mismatch(
        &self,
        state: &ReadOnlyState,
        elements: &[BlockElement],
        configs: &ConfigHolder,
        config_heights: &BTreeSet<u64>,
    ) -> Option<usize> {
        let first = elements.first()?;
        let initial_config = configs.config_at(first.block.height);
        let mut window = state.difficulty_infos_before(
            first.block.height.saturating_sub(1),
            initial_config.max_difficulty_blocks,
        );

        for (index, element) in elements.iter().enumerate() {
            let height = element.block.height;
            let config = configs.config_at(height);
            if config_heights.contains(&height) {
                window.clear();
            }

            let expected = calculate_difficulty(&window, config);
            if expected != element.block.difficulty {
                return Some(index);
            }

            window.push(DifficultyInfo {
                height,
                timestamp: element.block.timestamp,
                difficulty: element.block.difficulty,
            });
            if window.len() > config.max_difficulty_blocks {
                window.remove(0);
            }
        }
        None
    }
}

/// Default batch processor wiring link checks, generation hashes, the
/// hit predicate and the observer chain together.
pub struct BlockChainProcessor {
    hit_predicate: Box<dyn BlockHitPredicate>,
    observers: ObserverAggregate,
}

impl BlockChainProcessor {
    pub fn new(hit_predicate: Box<dyn BlockHitPredicate>, observers: ObserverAggregate) -> Self {
        Self {
            hit_predicate,
            observers,
        }
    }

    /// Production processor: effective-balance eligibility, standard
    /// observer chain.
    pub fn standard() -> Self {
        Self::new(
            Box::new(EffectiveBalanceHitPredicate),
            ObserverAggregate::standard(),
        )
    }

    fn signer_effective_balance(delta: &StateCacheDelta, signer: &PublicKey) -> u64 {
        delta
            .account(signer)
            .map(|account| account.effective_balance)
            .unwrap_or(0)
    }
}

impl BatchProcessor for BlockChainProcessor {
    fn process(
        &self,
        common: &BlockElement,
        elements: &mut [BlockElement],
        delta: &StateCacheDelta,
    ) -> Result<ValidationResult, SyncError> {
        let mut parent = common.clone();

        for element in elements.iter_mut() {
            let height = element.block.height;
            if !is_chain_link(&parent, &element.block) {
                return Ok(ValidationResult::Failure(ValidationFailure::BrokenLink {
                    height,
                }));
            }

            element.generation_hash =
                derive_generation_hash(&parent.generation_hash, &element.block.signer);

            let context = BlockHitContext {
                generation_hash: &element.generation_hash,
                signer_effective_balance: Self::signer_effective_balance(
                    delta,
                    &element.block.signer,
                ),
                elapsed_millis: element
                    .block
                    .timestamp
                    .saturating_sub(parent.block.timestamp),
                difficulty: element.block.difficulty,
            };
            if !self.hit_predicate.is_hit(&context) {
                return Ok(ValidationResult::Failure(ValidationFailure::BlockNotHit {
                    height,
                }));
            }

            if let Err(failure) = self.observers.execute(element, delta) {
                return Ok(ValidationResult::Failure(failure));
            }

            parent = element.clone();
        }

        Ok(ValidationResult::Success)
    }
}
