//! Domain layer: errors.

pub mod errors;
