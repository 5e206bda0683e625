//! # Shared Types
//!
//! Core blockchain entities and value types shared by every Ferrite-Chain
//! subsystem crate.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `Transaction`, `BlockElement`, `TransactionInfo`
//! - **Scoring**: `ChainScore` (128-bit cumulative chain weight)
//! - **Extraction**: helpers lifting hashes/infos out of block elements
//!
//! Entities are plain serde-derived structs. The hash-calculation stage
//! (`BlockElement::from_block`) computes entity hashes up front so that
//! everything downstream of it works with pre-hashed elements.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod extract;
pub mod score;

pub use entities::{
    Block, BlockElement, Hash, PublicKey, Signature, Transaction, TransactionInfo,
    TransactionPayload, GENESIS_HEIGHT,
};
pub use extract::{extract_transaction_hashes, extract_transaction_infos};
pub use score::ChainScore;
