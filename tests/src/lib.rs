//! # Ferrite-Chain Test Suite
//!
//! Cross-crate scenarios exercising the synchronization pipeline end to
//! end: storage, state cache and the sync engine wired together the way
//! the production process wires them.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # Chain builders and capture mocks
//!     ├── sync_flows.rs     # Adoption, reorg, rejection scenarios
//!     └── commit_safety.rs  # Checkpoint ordering and reconciliation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fc-tests
//! cargo test -p fc-tests integration::sync_flows
//! ```

#![allow(dead_code)]

pub mod integration;
