//! Port traits for block storage.

pub mod outbound;
