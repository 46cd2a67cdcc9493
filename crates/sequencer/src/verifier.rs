//! Checks a batch hash against the DA layer.

use std::{fmt, sync::Arc};

use based_da::{DaError, DaGateway};
use based_primitives::BatchHash;
use based_storage::HashChainManager;
use tracing::*;

use crate::{
    assembler::{AssembledBatch, BatchAssembler},
    SequencerError,
};

/// Re-derives indexed batches to confirm DA still serves them unchanged.
pub struct BatchVerifier<D> {
    assembler: BatchAssembler<D>,
    index: Arc<HashChainManager>,
}

impl<D> Clone for BatchVerifier<D> {
    fn clone(&self) -> Self {
        Self {
            assembler: self.assembler.clone(),
            index: self.index.clone(),
        }
    }
}

impl<D> fmt::Debug for BatchVerifier<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchVerifier")
            .field("assembler", &self.assembler)
            .finish_non_exhaustive()
    }
}

impl<D: DaGateway> BatchVerifier<D> {
    pub fn new(assembler: BatchAssembler<D>, index: Arc<HashChainManager>) -> Self {
        Self { assembler, index }
    }

    /// Returns whether `hash` is a batch this index knows and DA still
    /// produces the same content at its height.
    ///
    /// Unknown hashes and heights DA can't serve are `false`. Other DA
    /// failures are errors.
    pub async fn verify_batch(&self, hash: &BatchHash) -> Result<bool, SequencerError> {
        let Some(height) = self.index.get_hash_mapping(*hash).await? else {
            debug!(%hash, "verify: unknown batch");
            return Ok(false);
        };

        match self.assembler.assemble(height).await {
            Ok(AssembledBatch::Ready { batch, .. }) => {
                let actual = batch.hash();
                if actual != *hash {
                    warn!(%hash, %actual, %height, "verify: batch content changed");
                }
                Ok(actual == *hash)
            }
            Ok(AssembledBatch::FutureHeight) | Err(DaError::BlobNotFound) => {
                debug!(%hash, %height, "verify: batch unavailable");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
