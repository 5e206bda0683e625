//! Inbound port: the synchronization entry point.

use shared_types::{BlockElement, ChainScore};

use crate::domain::errors::{SyncError, SyncRejection};

/// Where a candidate batch came from. Rollbacks below the tip are only
/// honored for chains the local node actively pulled; other channels
/// may extend the chain or replace exactly the tip block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Origin unknown.
    Unknown,
    /// Produced locally (e.g. harvested).
    Local,
    /// Pushed unsolicited by a remote peer.
    RemotePush,
    /// Pulled from a remote peer during active synchronization.
    RemotePull,
}

impl InputSource {
    /// Whether this source may rewrite local blocks below the tip.
    pub fn allows_rollback(&self) -> bool {
        matches!(self, InputSource::RemotePull)
    }
}

/// What a synchronization attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The candidate chain was adopted.
    Continue {
        /// New local chain height.
        height: u64,
        /// Net score change applied to the score holder.
        score_delta: ChainScore,
    },
    /// The candidate chain was rejected; nothing changed.
    Aborted(SyncRejection),
}

/// The synchronization API.
pub trait ChainSynchronizer: Send + Sync {
    /// Attempt to adopt `elements` from `source`.
    ///
    /// Generation hashes are derived into the elements in place, so the
    /// batch is mutable even when it ends up rejected.
    fn synchronize(
        &self,
        elements: &mut Vec<BlockElement>,
        source: InputSource,
    ) -> Result<SyncOutcome, SyncError>;
}
