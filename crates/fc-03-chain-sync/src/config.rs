//! # Chain Configuration
//!
//! Consensus parameters, keyed by the height at which they take effect.
//! `ConfigHolder::config_at(height)` resolves the entry with the greatest
//! effective height at or below the queried height, so configuration
//! changes announced mid-chain apply from their boundary onward.

use std::collections::BTreeMap;

/// Consensus parameters in force over a height range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    /// Deepest rollback the sync engine will accept.
    pub max_rollback_blocks: u64,
    /// Size of the difficulty-history window used for recomputation.
    pub max_difficulty_blocks: usize,
    /// Target spacing between blocks (milliseconds).
    pub block_generation_target_millis: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_rollback_blocks: 360,
            max_difficulty_blocks: 60,
            block_generation_target_millis: 15_000,
        }
    }
}

/// Height-keyed configuration lookup.
#[derive(Debug, Clone)]
pub struct ConfigHolder {
    initial: ChainConfig,
    configs: BTreeMap<u64, ChainConfig>,
}

impl ConfigHolder {
    /// Create a holder whose initial config applies from height 0.
    pub fn new(initial: ChainConfig) -> Self {
        let mut configs = BTreeMap::new();
        configs.insert(0, initial);
        Self { initial, configs }
    }

    /// Register a config taking effect at `height`.
    pub fn insert_at(&mut self, height: u64, config: ChainConfig) {
        self.configs.insert(height, config);
    }

    /// The config in force at `height`.
    pub fn config_at(&self, height: u64) -> &ChainConfig {
        self.configs
            .range(..=height)
            .next_back()
            .map(|(_, config)| config)
            .unwrap_or(&self.initial)
    }
}

impl Default for ConfigHolder {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}
