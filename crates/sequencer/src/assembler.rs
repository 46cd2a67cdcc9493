//! Turns one DA height into a batch.

use std::{fmt, sync::Arc};

use based_da::{DaError, DaGateway};
use based_primitives::{Batch, Namespace};
use chrono::{DateTime, Utc};
use tracing::*;

/// Outcome of assembling a height.
#[derive(Clone, Debug, PartialEq)]
pub enum AssembledBatch {
    /// The height exists. `timestamp` is the time DA attributes to it and is
    /// not part of the batch hash.
    Ready {
        batch: Batch,
        timestamp: DateTime<Utc>,
    },

    /// The DA layer hasn't produced the height yet.
    FutureHeight,
}

/// Reads the blobs at a height within one namespace, in DA order.
pub struct BatchAssembler<D> {
    da: Arc<D>,
    namespace: Namespace,
}

impl<D> Clone for BatchAssembler<D> {
    fn clone(&self) -> Self {
        Self {
            da: self.da.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl<D> fmt::Debug for BatchAssembler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchAssembler")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<D: DaGateway> BatchAssembler<D> {
    pub fn new(da: Arc<D>, namespace: Namespace) -> Self {
        Self { da, namespace }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn da(&self) -> &Arc<D> {
        &self.da
    }

    pub async fn assemble(&self, height: u64) -> Result<AssembledBatch, DaError> {
        let res = match self.da.get_ids(height, &self.namespace).await {
            Ok(res) => res,
            Err(DaError::FutureHeight { .. }) => return Ok(AssembledBatch::FutureHeight),
            Err(e) => return Err(e),
        };

        if res.ids.is_empty() {
            trace!(%height, "no blobs at height");
            return Ok(AssembledBatch::Ready {
                batch: Batch::empty(),
                timestamp: res.timestamp,
            });
        }

        let blobs = self.da.get(&res.ids, &self.namespace).await?;
        if blobs.len() != res.ids.len() {
            return Err(DaError::BlobCountMismatch {
                expected: res.ids.len(),
                got: blobs.len(),
            });
        }

        debug!(%height, txs = %blobs.len(), "assembled batch");
        Ok(AssembledBatch::Ready {
            batch: Batch::new(blobs),
            timestamp: res.timestamp,
        })
    }
}
