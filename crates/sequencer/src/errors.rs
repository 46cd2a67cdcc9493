use based_da::DaError;
use based_db::DbError;
use based_primitives::BatchHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("da: {0}")]
    Da(#[from] DaError),

    #[error("db: {0}")]
    Db(#[from] DbError),

    #[error("store contents inconsistent: batch {hash} is linked but has no height")]
    InconsistentIndex { hash: BatchHash },

    #[error("store contents inconsistent: batch {hash} indexed at height {height} which DA doesn't have")]
    IndexedHeightUnavailable { hash: BatchHash, height: u64 },

    #[error("store contents inconsistent: height {height} hashes to {actual}, index has {expected}")]
    HashMismatch {
        height: u64,
        expected: BatchHash,
        actual: BatchHash,
    },

    #[error("transaction of {size} bytes exceeds max blob size {max}")]
    TxTooLarge { size: usize, max: u64 },
}

impl SequencerError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the index disagrees with itself or with the DA layer.
    pub fn is_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::InconsistentIndex { .. }
                | Self::IndexedHeightUnavailable { .. }
                | Self::HashMismatch { .. }
        )
    }
}
