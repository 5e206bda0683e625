//! Ports: the inbound synchronization API and outbound collaborator traits.

pub mod inbound;
pub mod outbound;
