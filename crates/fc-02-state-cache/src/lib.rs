//! # State Cache (fc-02)
//!
//! Versioned, copy-on-write consensus state: account balances/importances
//! and the per-block difficulty history.
//!
//! ## Delta Discipline
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Exclusive Delta | At most one live delta per cache instance |
//! | 2 | Monotonic Height | Commit height never regresses |
//! | 3 | Drop Discards | A dropped delta leaves the cache unchanged |
//! | 4 | Single Mutator | Detached access is serialized by a shared lock |
//!
//! `StateCache::create_delta()` produces the one mutable overlay; it is
//! either committed at a height (changes become the new visible state) or
//! dropped (changes vanish). `delta.detach()` hands a second, unrelated
//! writer a try-lockable handle onto the same overlay without ever allowing
//! two concurrent mutating accesses.
//!
//! ## Crate Structure
//!
//! - `domain/` - account/difficulty sub-state and errors
//! - `service.rs` - `StateCache`, `StateCacheDelta`, `DetachedDelta`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod service;

pub use domain::accounts::AccountState;
pub use domain::difficulty::DifficultyInfo;
pub use domain::errors::StateCacheError;
pub use service::{
    CacheChanges, DetachedDelta, ReadOnlyState, StateCache, StateCacheDelta,
};
