//! Batch derivation and hash-chain indexing.

use std::{fmt, sync::Arc};

use based_da::DaGateway;
use based_primitives::{Batch, BatchHash};
use based_storage::HashChainManager;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::*;

use crate::{
    assembler::{AssembledBatch, BatchAssembler},
    cursor::HeightCursor,
    submitter::TxSubmitter,
    verifier::BatchVerifier,
    SequencerConfig, SequencerError,
};

/// A batch returned by [`BasedSequencer::get_next_batch`].
#[derive(Clone, Debug, PartialEq)]
pub struct NextBatch {
    pub batch: Batch,
    pub hash: BatchHash,

    /// DA height the batch was derived from.
    pub height: u64,
    pub timestamp: DateTime<Utc>,
}

/// Derives batches from the DA layer one height at a time and records the
/// chain of batch hashes so any replica can ask for the batch following one
/// it has already seen.
///
/// Taking `&mut self` in [`Self::get_next_batch`] makes this the only writer
/// of its cursor and index.
pub struct BasedSequencer<D> {
    assembler: BatchAssembler<D>,
    index: Arc<HashChainManager>,
    cursor: HeightCursor,

    /// Hash of the batch at the height just below the cursor.
    ///
    /// Its successor is always the next scanned height, whatever the index
    /// links it to, since identical content at an earlier height shares it.
    head: Option<BatchHash>,
    config: SequencerConfig,
}

impl<D> fmt::Debug for BasedSequencer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasedSequencer")
            .field("cursor", &self.cursor)
            .field("head", &self.head)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<D: DaGateway> BasedSequencer<D> {
    /// Creates a sequencer, resuming from the cursor stored in the index.
    pub async fn init(
        da: Arc<D>,
        index: Arc<HashChainManager>,
        config: SequencerConfig,
    ) -> Result<Self, SequencerError> {
        let stored = index.get_last_height().await?;
        let cursor = HeightCursor::restore(stored, config.start_height);
        let assembler = BatchAssembler::new(da, config.namespace.clone());

        let head = match stored.and_then(|next| next.checked_sub(1)) {
            Some(height) => Self::recover_head(&assembler, height).await?,
            None => None,
        };
        info!(next_height = %cursor.next(), resumed = %stored.is_some(), ?head, "initialized sequencer");

        Ok(Self {
            assembler,
            index,
            cursor,
            head,
            config,
        })
    }

    /// Re-derives the hash of the last scanned height.
    async fn recover_head(
        assembler: &BatchAssembler<D>,
        height: u64,
    ) -> Result<Option<BatchHash>, SequencerError> {
        match assembler.assemble(height).await? {
            AssembledBatch::Ready { batch, .. } => Ok(Some(batch.hash())),
            AssembledBatch::FutureHeight => {
                warn!(%height, "last scanned height is missing from DA");
                Ok(None)
            }
        }
    }

    /// Next DA height a scan would read.
    pub fn next_height(&self) -> u64 {
        self.cursor.next()
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn submitter(&self) -> TxSubmitter<D> {
        TxSubmitter::new(self.assembler.da().clone(), self.config.gas_price)
    }

    pub fn verifier(&self) -> BatchVerifier<D> {
        BatchVerifier::new(self.assembler.clone(), self.index.clone())
    }

    pub async fn verify_batch(&self, hash: &BatchHash) -> Result<bool, SequencerError> {
        self.verifier().verify_batch(hash).await
    }

    /// Returns the batch following `last`.
    ///
    /// If the index already knows the successor of `last` it is re-derived
    /// from its recorded height without touching the index. Otherwise DA is
    /// scanned from the cursor, waiting for heights that don't exist yet, and
    /// the result is indexed before it's returned. `None` always scans.
    pub async fn get_next_batch(
        &mut self,
        last: Option<&BatchHash>,
        cancel: &CancellationToken,
    ) -> Result<NextBatch, SequencerError> {
        if cancel.is_cancelled() {
            return Err(SequencerError::Cancelled);
        }

        if let Some(last) = last.filter(|last| self.head.as_ref() != Some(*last)) {
            if let Some(next) = self.index.get_next_hash(*last).await? {
                return self.get_indexed_batch(*last, next, cancel).await;
            }
        }

        self.scan(last, cancel).await
    }

    async fn get_indexed_batch(
        &self,
        last: BatchHash,
        hash: BatchHash,
        cancel: &CancellationToken,
    ) -> Result<NextBatch, SequencerError> {
        let mut height = self
            .index
            .get_hash_mapping(hash)
            .await?
            .ok_or(SequencerError::InconsistentIndex { hash })?;

        // Repeated content maps to its first height, which can sit at or
        // below `last`. The successor is then the height right after `last`.
        if let Some(last_height) = self.index.get_hash_mapping(last).await? {
            if height <= last_height {
                debug!(%hash, %height, %last_height, "successor shares content with an earlier height");
                height = last_height + 1;
            }
        }

        match self.assemble(height, cancel).await? {
            AssembledBatch::Ready { batch, timestamp } => {
                let actual = batch.hash();
                if actual != hash {
                    return Err(SequencerError::HashMismatch {
                        height,
                        expected: hash,
                        actual,
                    });
                }

                debug!(%height, %hash, "served indexed batch");
                Ok(NextBatch {
                    batch,
                    hash,
                    height,
                    timestamp,
                })
            }
            AssembledBatch::FutureHeight => {
                Err(SequencerError::IndexedHeightUnavailable { hash, height })
            }
        }
    }

    async fn scan(
        &mut self,
        last: Option<&BatchHash>,
        cancel: &CancellationToken,
    ) -> Result<NextBatch, SequencerError> {
        loop {
            if cancel.is_cancelled() {
                return Err(SequencerError::Cancelled);
            }

            let height = self.cursor.next();
            match self.assemble(height, cancel).await? {
                AssembledBatch::FutureHeight => {
                    trace!(%height, "height not available yet, waiting");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(SequencerError::Cancelled),
                        _ = tokio::time::sleep(self.config.retry_interval) => {}
                    }
                }
                AssembledBatch::Ready { batch, timestamp } => {
                    if cancel.is_cancelled() {
                        return Err(SequencerError::Cancelled);
                    }

                    let hash = batch.hash();
                    self.advance(last, hash, height).await?;

                    return Ok(NextBatch {
                        batch,
                        hash,
                        height,
                        timestamp,
                    });
                }
            }
        }
    }

    /// Assembles a height, abandoning the DA calls as soon as `cancel` fires.
    async fn assemble(
        &self,
        height: u64,
        cancel: &CancellationToken,
    ) -> Result<AssembledBatch, SequencerError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SequencerError::Cancelled),
            res = self.assembler.assemble(height) => Ok(res?),
        }
    }

    /// Persists a freshly derived batch and moves the cursor past it.
    ///
    /// The mapping is written before the link that makes it reachable, and
    /// the cursor last, so an interrupted advance leaves at worst an
    /// unreachable mapping and the height is scanned again. Entries are
    /// never overwritten and a batch is never linked to itself.
    async fn advance(
        &mut self,
        last: Option<&BatchHash>,
        hash: BatchHash,
        height: u64,
    ) -> Result<(), SequencerError> {
        match self.index.get_hash_mapping(hash).await? {
            Some(prev) if prev != height => {
                // Identical content at two heights hashes the same, the first
                // height stays authoritative.
                warn!(%hash, %prev, %height, "batch content already indexed at another height");
            }
            Some(_) => {}
            None => self.index.set_hash_mapping(hash, height).await?,
        }

        if let Some(last) = last.filter(|last| **last != hash) {
            match self.index.get_next_hash(*last).await? {
                Some(prev) if prev != hash => {
                    debug!(%last, %prev, %hash, "predecessor content already linked");
                }
                Some(_) => {}
                None => self.index.set_next_hash(*last, hash).await?,
            }
        }

        self.index.set_last_height(height + 1).await?;
        self.cursor.advance_past(height);
        self.head = Some(hash);

        info!(%height, %hash, "derived batch");
        Ok(())
    }
}
