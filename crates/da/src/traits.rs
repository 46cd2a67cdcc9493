use async_trait::async_trait;
use based_primitives::{BlobId, Namespace};

use crate::{DaError, GetIdsResult};

/// Access to the DA layer, scoped per call by a [`Namespace`].
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait DaGateway: Send + Sync + 'static {
    /// Largest blob, in bytes, the DA layer accepts.
    async fn max_blob_size(&self) -> Result<u64, DaError>;

    /// Publishes blobs, returning their ids in the same order.
    async fn submit(
        &self,
        blobs: Vec<Vec<u8>>,
        gas_price: f64,
        namespace: &Namespace,
    ) -> Result<Vec<BlobId>, DaError>;

    /// Lists the blob ids at a height.
    ///
    /// Fails with [`DaError::FutureHeight`] if the height doesn't exist yet.
    async fn get_ids(&self, height: u64, namespace: &Namespace) -> Result<GetIdsResult, DaError>;

    /// Fetches blobs by id, returned in the order of `ids`.
    async fn get(&self, ids: &[BlobId], namespace: &Namespace) -> Result<Vec<Vec<u8>>, DaError>;
}
