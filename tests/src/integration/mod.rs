//! Cross-crate synchronization scenarios.

pub mod commit_safety;
pub mod fixtures;
pub mod sync_flows;
