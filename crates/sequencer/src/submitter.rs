//! Forwarding of rollup transactions to the DA layer.

use std::{fmt, sync::Arc};

use based_da::DaGateway;
use based_primitives::{BlobId, Namespace, RollupId};
use tokio::sync::OnceCell;
use tracing::*;

use crate::SequencerError;

/// Ids the DA layer assigned to a submitted transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmitReceipt {
    pub ids: Vec<BlobId>,
}

/// Submits each transaction as its own blob under the rollup's namespace.
///
/// Holds no index state, so it can run alongside batch derivation.
pub struct TxSubmitter<D> {
    da: Arc<D>,
    gas_price: f64,
    max_blob_size: Arc<OnceCell<u64>>,
}

impl<D> Clone for TxSubmitter<D> {
    fn clone(&self) -> Self {
        Self {
            da: self.da.clone(),
            gas_price: self.gas_price,
            max_blob_size: self.max_blob_size.clone(),
        }
    }
}

impl<D> fmt::Debug for TxSubmitter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxSubmitter")
            .field("gas_price", &self.gas_price)
            .field("max_blob_size", &self.max_blob_size.get())
            .finish_non_exhaustive()
    }
}

impl<D: DaGateway> TxSubmitter<D> {
    pub fn new(da: Arc<D>, gas_price: f64) -> Self {
        Self {
            da,
            gas_price,
            max_blob_size: Arc::new(OnceCell::new()),
        }
    }

    /// Max blob size, fetched from DA on first use.
    async fn max_blob_size(&self) -> Result<u64, SequencerError> {
        let size = self
            .max_blob_size
            .get_or_try_init(|| self.da.max_blob_size())
            .await?;
        Ok(*size)
    }

    pub async fn submit_rollup_transaction(
        &self,
        rollup_id: &RollupId,
        tx: Vec<u8>,
    ) -> Result<SubmitReceipt, SequencerError> {
        let max = self.max_blob_size().await?;
        if tx.len() as u64 > max {
            return Err(SequencerError::TxTooLarge {
                size: tx.len(),
                max,
            });
        }

        let size = tx.len();
        let namespace = Namespace::from(rollup_id);
        let ids = self.da.submit(vec![tx], self.gas_price, &namespace).await?;

        debug!(%rollup_id, %size, blobs = %ids.len(), "submitted transaction");
        Ok(SubmitReceipt { ids })
    }
}
