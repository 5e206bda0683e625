//! # Block Storage (fc-01)
//!
//! Append-only, height-indexed persistence of committed blocks.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Contiguous Heights | Blocks 1..height with no gaps |
//! | 2 | Genesis Floor | The chain is never truncated below genesis |
//! | 3 | Staged Replacement | drop + append become visible only on commit |
//! | 4 | Reader Isolation | A view never observes a half-replaced chain |
//!
//! ## Access Discipline
//!
//! `BlockStorage::view()` hands out read-only snapshots; any number may be
//! live concurrently. `BlockStorage::modifier()` hands out the single
//! exclusive writer, which stages `drop_blocks_after` + `save_blocks` in
//! memory and pushes them to the backing [`BlockStore`] only on `commit()`.
//! Acquiring the modifier blocks until all views release (reader/writer
//! lock semantics).
//!
//! ## Crate Structure
//!
//! - `domain/` - errors
//! - `ports/` - the `BlockStore` outbound port
//! - `adapters/` - in-memory and file-per-height store adapters
//! - `service.rs` - `BlockStorage` view/modifier front

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileBlockStore, MemoryBlockStore};
pub use domain::errors::BlockStorageError;
pub use ports::outbound::BlockStore;
pub use service::{BlockStorage, BlockStorageModifier, BlockStorageView};
