//! Domain layer: pure sync logic and error taxonomy.

pub mod difficulty;
pub mod errors;
pub mod link;
pub mod netconfig;
pub mod sync_state;
pub mod unwind;
