//! # Difficulty Calculation
//!
//! Difficulty retargets toward the configured block generation interval.
//! The next difficulty is the window average scaled by the ratio of the
//! target time to the observed average time, smoothed to at most a 5%
//! move from the most recent difficulty and clamped to the global bounds.

use fc_02_state_cache::DifficultyInfo;

use crate::config::ChainConfig;

/// Difficulty assigned when there is not enough history to retarget.
pub const DEFAULT_DIFFICULTY: u64 = 100_000_000_000_000;

/// Lower clamp for calculated difficulties.
pub const MIN_DIFFICULTY: u64 = DEFAULT_DIFFICULTY / 10;

/// Upper clamp for calculated difficulties.
pub const MAX_DIFFICULTY: u64 = DEFAULT_DIFFICULTY * 10;

/// Calculate the difficulty for the block following `history`.
///
/// `history` must be ascending by height. Fewer than two entries cannot
/// yield an observed block time, so the default difficulty applies.
pub fn calculate_difficulty(history: &[DifficultyInfo], config: &ChainConfig) -> u64 {
    if history.len() < 2 {
        return DEFAULT_DIFFICULTY;
    }

    let first = &history[0];
    let last = &history[history.len() - 1];
    let intervals = (history.len() - 1) as u64;
    let observed_millis =
        (last.timestamp.saturating_sub(first.timestamp) / intervals).max(1);

    let sum: u128 = history.iter().map(|info| u128::from(info.difficulty)).sum();
    let average = sum / history.len() as u128;

    let scaled = average * u128::from(config.block_generation_target_millis)
        / u128::from(observed_millis);

    // Smooth to at most a 5% move from the latest difficulty.
    let floor = u128::from(last.difficulty) * 95 / 100;
    let ceiling = u128::from(last.difficulty) * 105 / 100;
    let smoothed = scaled.clamp(floor, ceiling);

    let bounded = smoothed.clamp(u128::from(MIN_DIFFICULTY), u128::from(MAX_DIFFICULTY));
    bounded as u64
}
