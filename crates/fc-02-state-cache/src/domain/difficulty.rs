//! # Difficulty Sub-State
//!
//! Per-block difficulty history. The difficulty checker recomputes
//! candidate difficulties from the most recent window of these entries;
//! the processor inserts an entry per executed block and the undo path
//! removes them again.

use serde::{Deserialize, Serialize};

/// Timestamp and difficulty recorded for one committed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyInfo {
    /// Block height.
    pub height: u64,
    /// Block timestamp (milliseconds).
    pub timestamp: u64,
    /// Declared difficulty.
    pub difficulty: u64,
}
