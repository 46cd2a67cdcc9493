//! Trait definitions for the low level index interface.

use based_primitives::BatchHash;

use crate::DbResult;

/// Database interface for the hash-chain index.
///
/// Every write is individually atomic and durable once it returns. There are
/// no multi-key transactions, and a single writer is assumed. Missing entries
/// are reported as `Ok(None)`.
pub trait HashChainDatabase: Send + Sync + 'static {
    /// Gets the next DA height to scan, if one was ever recorded.
    fn get_last_height(&self) -> DbResult<Option<u64>>;

    /// Records the next DA height to scan.
    fn set_last_height(&self, height: u64) -> DbResult<()>;

    /// Records the DA height a batch hash was derived from.
    fn set_hash_mapping(&self, hash: BatchHash, height: u64) -> DbResult<()>;

    /// Gets the DA height a batch hash was derived from.
    fn get_hash_mapping(&self, hash: BatchHash) -> DbResult<Option<u64>>;

    /// Links a batch hash to the hash of the batch returned after it.
    fn set_next_hash(&self, current: BatchHash, next: BatchHash) -> DbResult<()>;

    /// Gets the hash of the batch that followed `current`.
    fn get_next_hash(&self, current: BatchHash) -> DbResult<Option<BatchHash>>;
}
