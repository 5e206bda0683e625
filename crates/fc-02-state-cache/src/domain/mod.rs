//! Domain layer: sub-state entities and errors.

pub mod accounts;
pub mod difficulty;
pub mod errors;
