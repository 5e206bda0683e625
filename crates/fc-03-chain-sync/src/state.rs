//! Explicit dependency bundle handed to the sync engine.

use std::sync::Arc;

use fc_01_block_storage::BlockStorage;
use fc_02_state_cache::StateCache;

use crate::config::ConfigHolder;
use crate::score::ChainScoreHolder;

/// Everything the engine reads and writes. No ambient globals; the
/// caller decides what is shared and with whom.
#[derive(Clone)]
pub struct LocalChainState {
    /// Committed block persistence.
    pub storage: Arc<BlockStorage>,
    /// Versioned consensus state.
    pub cache: Arc<StateCache>,
    /// Cumulative chain score.
    pub score: Arc<ChainScoreHolder>,
    /// Height-keyed consensus parameters.
    pub configs: Arc<ConfigHolder>,
}

impl LocalChainState {
    pub fn new(
        storage: Arc<BlockStorage>,
        cache: Arc<StateCache>,
        score: Arc<ChainScoreHolder>,
        configs: Arc<ConfigHolder>,
    ) -> Self {
        Self {
            storage,
            cache,
            score,
            configs,
        }
    }
}
