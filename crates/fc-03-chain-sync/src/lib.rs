//! # Chain Sync (fc-03)
//!
//! The synchronization engine: decides whether a candidate chain from a
//! peer should replace part of the local chain, and applies the switch
//! atomically across block storage and the state cache.
//!
//! ## Attempt Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Strict Improvement | A candidate is adopted only if its score beats the unwound segment; ties lose |
//! | 2 | No Partial Adoption | Rejection at any stage leaves storage, cache and score untouched |
//! | 3 | Ordered Commit | Blocks, then state notification, then durable commit; the marker records progress |
//! | 4 | Single Score Path | Only the state-change notification advances the chain score |
//! | 5 | Common Undo Once | The fork point is undone exactly once, non-destructively |
//!
//! ## Crate Structure
//!
//! - `domain/` - link/score math, difficulty retargeting, unwind and
//!   rejection taxonomy
//! - `ports/` - the `ChainSynchronizer` API and outbound collaborator traits
//! - `processor.rs` - default batch processor, observers, difficulty checker
//! - `checkpoint.rs` - commit-step marker persistence
//! - `service.rs` - the `ChainSyncService` engine

#![warn(clippy::all)]

pub mod checkpoint;
pub mod config;
pub mod domain;
pub mod ports;
pub mod processor;
pub mod reconcile;
pub mod score;
pub mod service;
pub mod state;

pub use checkpoint::{CommitOperationStep, CommitStepObserver, FileCommitStepWriter};
pub use config::{ChainConfig, ConfigHolder};
pub use domain::errors::{SyncError, SyncRejection, ValidationFailure, ValidationResult};
pub use domain::unwind::UndoMode;
pub use ports::inbound::{ChainSynchronizer, InputSource, SyncOutcome};
pub use ports::outbound::{StateChangeInfo, SyncHandlers};
pub use processor::{BlockChainProcessor, ObserverAggregate, RollingDifficultyChecker};
pub use score::ChainScoreHolder;
pub use service::ChainSyncService;
pub use state::LocalChainState;
