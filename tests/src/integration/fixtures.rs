//! Chain builders and capture mocks shared by the integration scenarios.

use std::sync::Arc;

use parking_lot::Mutex;

use fc_01_block_storage::BlockStorage;
use fc_02_state_cache::{AccountState, DifficultyInfo, StateCache, StateCacheDelta};
use fc_03_chain_sync::checkpoint::{CommitOperationStep, CommitStepObserver};
use fc_03_chain_sync::domain::difficulty::DEFAULT_DIFFICULTY;
use fc_03_chain_sync::domain::errors::SyncError;
use fc_03_chain_sync::ports::outbound::{TransactionsChangeObserver, UndoBlockObserver};
use fc_03_chain_sync::{ChainScoreHolder, ConfigHolder, LocalChainState, UndoMode};
use shared_types::{
    Block, BlockElement, ChainScore, Hash, Transaction, TransactionInfo, TransactionPayload,
};

/// Target block spacing used by every fixture chain.
pub const TARGET_MILLIS: u64 = 15_000;

/// A transfer with a hash determined by its seed.
pub fn transfer(seed: u8, amount: u64, fee: u64) -> Transaction {
    Transaction {
        signer: [seed; 32],
        fee,
        deadline: 1_000_000,
        payload: TransactionPayload::Transfer {
            recipient: [seed.wrapping_add(100); 32],
            amount,
        },
        signature: [0; 64],
    }
}

/// A network-config announcement applying `delta` blocks ahead.
pub fn config_announcement(delta: u64) -> Transaction {
    Transaction {
        signer: [200; 32],
        fee: 0,
        deadline: 1_000_000,
        payload: TransactionPayload::NetworkConfig {
            payload: delta.to_le_bytes().to_vec(),
        },
        signature: [0; 64],
    }
}

fn build_block(height: u64, timestamp: u64, previous: Hash, transactions: Vec<Transaction>) -> Block {
    Block {
        height,
        timestamp,
        difficulty: DEFAULT_DIFFICULTY,
        signer: [1; 32],
        signature: [0; 64],
        previous_block_hash: previous,
        transactions,
    }
}

/// Hash-linked chain 1..=count at the target spacing, no transactions.
pub fn seeded_chain(count: u64) -> Vec<BlockElement> {
    let mut elements: Vec<BlockElement> = Vec::new();
    for height in 1..=count {
        let previous = elements.last().map(|e| e.entity_hash).unwrap_or([0; 32]);
        elements.push(BlockElement::from_block(build_block(
            height,
            height * TARGET_MILLIS,
            previous,
            vec![],
        )));
    }
    elements
}

/// Extend `parent` with `per_block` transaction loads, one block per
/// entry, keeping the target spacing.
pub fn extend_with_transactions(
    parent: &BlockElement,
    per_block: Vec<Vec<Transaction>>,
) -> Vec<BlockElement> {
    let mut elements: Vec<BlockElement> = Vec::new();
    for transactions in per_block {
        let previous = elements.last().unwrap_or(parent);
        elements.push(BlockElement::from_block(build_block(
            previous.block.height + 1,
            previous.block.timestamp + TARGET_MILLIS,
            previous.entity_hash,
            transactions,
        )));
    }
    elements
}

/// Extend `parent` with `count` empty blocks at the target spacing.
pub fn extend(parent: &BlockElement, count: u64) -> Vec<BlockElement> {
    extend_with_transactions(parent, vec![vec![]; count as usize])
}

/// Like [`extend`], but each block arrives `interval_millis` after its
/// parent. Faster blocks score lower per block but allow denser chains.
pub fn extend_with_interval(
    parent: &BlockElement,
    count: u64,
    interval_millis: u64,
    difficulty: u64,
) -> Vec<BlockElement> {
    let mut elements: Vec<BlockElement> = Vec::new();
    for _ in 0..count {
        let previous = elements.last().unwrap_or(parent);
        let mut block = build_block(
            previous.block.height + 1,
            previous.block.timestamp + interval_millis,
            previous.entity_hash,
            vec![],
        );
        block.difficulty = difficulty;
        elements.push(BlockElement::from_block(block));
    }
    elements
}

/// Storage, cache, score and config wired the way the process wires
/// them: blocks persisted, difficulty history committed at the tip.
pub fn setup_state(local: &[BlockElement]) -> LocalChainState {
    let storage = Arc::new(BlockStorage::in_memory());
    {
        let mut modifier = storage.modifier();
        modifier
            .save_blocks(local.iter().cloned())
            .expect("fixture chain is contiguous");
        modifier.commit().expect("in-memory commit");
    }

    let cache = Arc::new(StateCache::new(60));
    if let Some(tip) = local.last() {
        let delta = cache.create_delta().expect("fresh cache");
        for element in local {
            delta.insert_difficulty(DifficultyInfo {
                height: element.block.height,
                timestamp: element.block.timestamp,
                difficulty: element.block.difficulty,
            });
        }
        delta.commit(tip.block.height).expect("seed commit");
    }

    LocalChainState::new(
        storage,
        cache,
        Arc::new(ChainScoreHolder::new(ChainScore::default())),
        Arc::new(ConfigHolder::default()),
    )
}

/// Credit `balance` to `signer` in the committed cache state.
pub fn fund_account(state: &LocalChainState, signer: [u8; 32], balance: u64) {
    let delta = state.cache.create_delta().expect("no delta outstanding");
    delta.upsert_account(signer, AccountState::with_balance(balance));
    let height = state.cache.height();
    delta.commit(height).expect("funding commit");
}

/// Records every undo call in invocation order.
#[derive(Clone, Default)]
pub struct UndoRecorder {
    pub calls: Arc<Mutex<Vec<(u64, UndoMode)>>>,
}

impl UndoBlockObserver for UndoRecorder {
    fn undo_block(
        &self,
        element: &BlockElement,
        _delta: &StateCacheDelta,
        mode: UndoMode,
    ) -> Result<(), SyncError> {
        self.calls.lock().push((element.block.height, mode));
        Ok(())
    }
}

/// Records every commit-step announcement in order.
#[derive(Clone, Default)]
pub struct StepRecorder {
    pub steps: Arc<Mutex<Vec<CommitOperationStep>>>,
}

impl CommitStepObserver for StepRecorder {
    fn on_step(&self, step: CommitOperationStep) -> Result<(), SyncError> {
        self.steps.lock().push(step);
        Ok(())
    }
}

/// Records the reconciliation event of the last successful attempt.
#[derive(Clone, Default)]
pub struct TransactionsChangeRecorder {
    pub added: Arc<Mutex<Vec<Hash>>>,
    pub reverted: Arc<Mutex<Vec<Hash>>>,
}

impl TransactionsChangeObserver for TransactionsChangeRecorder {
    fn on_transactions_change(
        &self,
        added: &[TransactionInfo],
        reverted: &[TransactionInfo],
    ) -> Result<(), SyncError> {
        *self.added.lock() = added.iter().map(|info| info.entity_hash).collect();
        *self.reverted.lock() = reverted.iter().map(|info| info.entity_hash).collect();
        Ok(())
    }
}
