//! # Network Configuration Extraction
//!
//! A `NetworkConfig` transaction announces new consensus parameters that
//! take effect `delta` blocks after the block carrying it. The payload is
//! the delta as exactly eight little-endian bytes; anything else marks
//! the carrying block malformed.

use std::collections::BTreeSet;

use shared_types::{BlockElement, TransactionPayload};

/// Effective heights of every config transaction in `elements`.
///
/// Returns the height of the first block carrying a malformed payload.
pub fn extract_config_heights(elements: &[BlockElement]) -> Result<BTreeSet<u64>, u64> {
    let mut heights = BTreeSet::new();
    for element in elements {
        for transaction in &element.block.transactions {
            if let TransactionPayload::NetworkConfig { payload } = &transaction.payload {
                let delta = decode_height_delta(payload).ok_or(element.block.height)?;
                heights.insert(element.block.height + delta);
            }
        }
    }
    Ok(heights)
}

fn decode_height_delta(payload: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = payload.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
