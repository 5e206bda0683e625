//! # Ferrite-Chain Node Runtime
//!
//! Bootstrap for a node process: open the file-backed block store,
//! create the genesis block on first run, rebuild the in-memory chain
//! score, inspect the commit checkpoint left by a previous run, and
//! wire the synchronization engine with its production collaborators.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize telemetry
//! 3. Open block storage; write genesis if the store is empty
//! 4. Inspect the commit-step marker (incomplete commit = refuse to start)
//! 5. Rebuild the cumulative chain score from stored blocks
//! 6. Construct the engine

pub mod genesis;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use fc_01_block_storage::{BlockStorage, FileBlockStore};
use fc_02_state_cache::{DifficultyInfo, StateCache};
use fc_03_chain_sync::domain::link::calculate_partial_chain_score;
use fc_03_chain_sync::{
    ChainConfig, ChainScoreHolder, ChainSyncService, CommitOperationStep, ConfigHolder,
    FileCommitStepWriter, LocalChainState,
};
use shared_types::{ChainScore, GENESIS_HEIGHT};

/// How many recent difficulty entries the cache keeps.
const DIFFICULTY_HISTORY_DEPTH: u64 = 60;

/// Node process configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Directory holding block files and the commit marker.
    pub data_dir: PathBuf,
    /// Consensus parameters in force from genesis.
    pub chain: ChainConfig,
}

impl RuntimeConfig {
    /// Read `FC_DATA_DIR` (default `./data`) and default consensus
    /// parameters.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("FC_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Self {
            data_dir,
            chain: ChainConfig::default(),
        }
    }
}

/// A bootstrapped node: shared state plus the wired engine.
pub struct Node {
    /// The dependency bundle shared with query surfaces.
    pub state: LocalChainState,
    /// The synchronization engine.
    pub engine: ChainSyncService,
}

/// Build a [`Node`] from `config`.
///
/// Refuses to start when the commit marker shows a previous run died
/// between `BlocksWritten` and `AllUpdated`; operator intervention (or
/// a replay tool) must resolve that first.
pub fn bootstrap(config: &RuntimeConfig) -> Result<Node> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    let marker = FileCommitStepWriter::new(&config.data_dir);
    match marker.read_step().context("reading commit marker")? {
        None | Some(CommitOperationStep::AllUpdated) => {}
        Some(step) => {
            bail!("previous run left an incomplete commit at step {step:?}");
        }
    }

    let store = FileBlockStore::open(config.data_dir.join("blocks"))
        .context("opening block store")?;
    let storage = Arc::new(BlockStorage::new(store));

    if storage.view().chain_height() == 0 {
        let mut modifier = storage.modifier();
        modifier
            .save_block(genesis::genesis_element())
            .context("staging genesis block")?;
        modifier.commit().context("writing genesis block")?;
        tracing::info!("genesis block written");
    }

    let cache = Arc::new(StateCache::new(DIFFICULTY_HISTORY_DEPTH));
    let score = Arc::new(ChainScoreHolder::new(ChainScore::default()));
    rebuild_from_storage(&storage, &cache, &score).context("rebuilding chain state")?;

    let state = LocalChainState::new(
        storage,
        cache,
        score,
        Arc::new(ConfigHolder::new(config.chain)),
    );
    let engine = ChainSyncService::standard(
        state.clone(),
        Box::new(FileCommitStepWriter::new(&config.data_dir)),
    );

    tracing::info!(
        height = state.storage.view().chain_height(),
        score = %state.score.current(),
        "node bootstrapped"
    );
    Ok(Node { state, engine })
}

/// Replay stored blocks into the score holder and the difficulty
/// history. Balances are not replayed here; they are rebuilt by the
/// state snapshot loader, which is outside this runtime's scope.
fn rebuild_from_storage(
    storage: &BlockStorage,
    cache: &StateCache,
    score: &ChainScoreHolder,
) -> Result<()> {
    let view = storage.view();
    let height = view.chain_height();
    let genesis = view.load_block(GENESIS_HEIGHT).context("loading genesis")?;

    let mut blocks = Vec::with_capacity(height.saturating_sub(1) as usize);
    for h in GENESIS_HEIGHT + 1..=height {
        blocks.push(view.load_block(h).with_context(|| format!("loading block {h}"))?);
    }
    score.add(calculate_partial_chain_score(&genesis, blocks.iter()));

    let delta = cache
        .create_delta()
        .context("acquiring cache delta for replay")?;
    let window_floor = height.saturating_sub(DIFFICULTY_HISTORY_DEPTH);
    for block in std::iter::once(&genesis).chain(blocks.iter()) {
        if block.height > window_floor {
            delta.insert_difficulty(DifficultyInfo {
                height: block.height,
                timestamp: block.timestamp,
                difficulty: block.difficulty,
            });
        }
    }
    delta.commit(height).context("committing replayed state")?;
    Ok(())
}
