//! Thread-safe holder for the cumulative local chain score.

use parking_lot::RwLock;
use shared_types::ChainScore;

/// Shared cumulative score of the locally stored chain.
#[derive(Debug, Default)]
pub struct ChainScoreHolder {
    score: RwLock<ChainScore>,
}

impl ChainScoreHolder {
    pub fn new(initial: ChainScore) -> Self {
        Self {
            score: RwLock::new(initial),
        }
    }

    /// Snapshot of the current score.
    pub fn current(&self) -> ChainScore {
        *self.score.read()
    }

    /// Apply a (possibly wrapping-negative) score delta.
    pub fn add(&self, delta: ChainScore) {
        *self.score.write() += delta;
    }

    /// Remove `delta` from the score.
    pub fn subtract(&self, delta: ChainScore) {
        *self.score.write() -= delta;
    }

    /// Current score as (high, low) words.
    pub fn to_parts(&self) -> [u64; 2] {
        self.score.read().to_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let holder = ChainScoreHolder::new(ChainScore::new(10));
        holder.add(ChainScore::new(5));
        holder.add(ChainScore::new(7));
        assert_eq!(holder.current(), ChainScore::new(22));
    }

    #[test]
    fn test_negative_delta_round_trips() {
        // A delta computed as peer - local wraps when local is larger;
        // adding it back must land on the smaller score.
        let holder = ChainScoreHolder::new(ChainScore::new(100));
        let delta = ChainScore::new(40) - ChainScore::new(60);
        holder.add(delta);
        assert_eq!(holder.current(), ChainScore::new(80));
    }
}
