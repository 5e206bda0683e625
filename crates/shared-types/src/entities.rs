//! # Core Chain Entities
//!
//! The block and transaction types flowing through the synchronization core.
//!
//! A `Block` is immutable once stored. A `BlockElement` wraps a block with
//! derived metadata (entity hash, generation hash, per-transaction hashes)
//! computed by the hash-calculation stage before the element reaches the
//! sync engine. The engine fills `generation_hash` in place during
//! processing; that is the only documented mutation of an element.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 64-byte signature.
pub type Signature = [u8; 64];

/// A 32-byte public key.
pub type PublicKey = [u8; 32];

/// Height of the genesis block. Heights are 1-based and contiguous.
pub const GENESIS_HEIGHT: u64 = 1;

/// Transaction payload variants understood by the sync core.
///
/// Network configuration changes travel inside ordinary blocks; the sync
/// engine extracts their effective heights during preprocessing. The
/// payload encodes `apply_height_delta` as exactly 8 little-endian bytes;
/// any other length is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    /// A plain value transfer.
    Transfer {
        /// Recipient public key.
        recipient: PublicKey,
        /// Amount in base units.
        amount: u64,
    },
    /// An embedded network-configuration change announcement.
    NetworkConfig {
        /// Raw payload; 8 LE bytes encoding the apply-height delta.
        payload: Vec<u8>,
    },
}

/// A transaction carried by a block.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Signer public key.
    pub signer: PublicKey,
    /// Fee in base units.
    pub fee: u64,
    /// Deadline timestamp (milliseconds).
    pub deadline: u64,
    /// Payload.
    pub payload: TransactionPayload,
    /// Signature over the transaction.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl Transaction {
    /// Compute the transaction's entity hash.
    pub fn entity_hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.signer);
        hasher.update(self.fee.to_le_bytes());
        hasher.update(self.deadline.to_le_bytes());
        match &self.payload {
            TransactionPayload::Transfer { recipient, amount } => {
                hasher.update([0u8]);
                hasher.update(recipient);
                hasher.update(amount.to_le_bytes());
            }
            TransactionPayload::NetworkConfig { payload } => {
                hasher.update([1u8]);
                hasher.update(payload);
            }
        }
        hasher.update(self.signature);
        hasher.finalize().into()
    }
}

/// A block. Immutable once committed to storage.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based chain height; height 1 is the genesis block.
    pub height: u64,
    /// Block timestamp (milliseconds).
    pub timestamp: u64,
    /// Declared block difficulty.
    pub difficulty: u64,
    /// Harvester/signer public key.
    pub signer: PublicKey,
    /// Signature over the block.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    /// Hash of the previous block.
    pub previous_block_hash: Hash,
    /// Transactions included in this block.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Compute the block's entity hash (header fields plus transaction
    /// hashes; transaction bodies are covered through their hashes).
    pub fn entity_hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.difficulty.to_le_bytes());
        hasher.update(self.signer);
        hasher.update(self.signature);
        hasher.update(self.previous_block_hash);
        for transaction in &self.transactions {
            hasher.update(transaction.entity_hash());
        }
        hasher.finalize().into()
    }
}

/// A block plus derived metadata.
///
/// `transaction_hashes` runs parallel to `block.transactions`.
/// `generation_hash` is zeroed until the processing stage derives it from
/// the parent element's generation hash and the block signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockElement {
    /// The wrapped block.
    pub block: Block,
    /// Hash of the block.
    pub entity_hash: Hash,
    /// Consensus generation hash; filled during processing.
    pub generation_hash: Hash,
    /// Entity hash of each transaction, in block order.
    pub transaction_hashes: Vec<Hash>,
}

impl BlockElement {
    /// Run the hash-calculation stage over a block.
    pub fn from_block(block: Block) -> Self {
        let entity_hash = block.entity_hash();
        let transaction_hashes = block
            .transactions
            .iter()
            .map(Transaction::entity_hash)
            .collect();
        Self {
            block,
            entity_hash,
            generation_hash: [0; 32],
            transaction_hashes,
        }
    }

    /// Iterate over (transaction, entity hash) pairs.
    pub fn transactions_with_hashes(&self) -> impl Iterator<Item = (&Transaction, &Hash)> {
        self.block
            .transactions
            .iter()
            .zip(self.transaction_hashes.iter())
    }
}

/// A transaction together with its entity hash, detached from its block.
///
/// This is the unit of reorg accounting: transactions removed from the
/// local chain during unwind are carried as infos until the engine decides
/// which of them were truly reverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// The transaction.
    pub transaction: Transaction,
    /// Its entity hash.
    pub entity_hash: Hash,
}
