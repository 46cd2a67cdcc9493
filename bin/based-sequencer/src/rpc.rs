//! Sequencing RPC server implementation.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use based_da::DaGateway;
use based_primitives::{BatchHash, RollupId};
use based_rpc_api::SequencerApiServer;
use based_rpc_types::{HexBytes, RpcBatch, RpcSubmitReceipt};
use based_sequencer::{
    BasedSequencer, BatchVerifier, NextBatch, SequencerError, SubmitReceipt, TxSubmitter,
};
use jsonrpsee::{
    core::RpcResult,
    server::{ServerBuilder, ServerHandle},
    types::{
        error::{INTERNAL_ERROR_CODE, INVALID_PARAMS_CODE},
        ErrorObjectOwned,
    },
    RpcModule,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::*;

/// Custom error code for failures reported by the DA layer.
const DA_ERROR_CODE: i32 = -32001;

/// Custom error code for `getNextBatch` calls that gave up waiting.
const CANCELLED_ERROR_CODE: i32 = -32002;

pub(crate) struct SequencerRpcImpl<D> {
    sequencer: Arc<Mutex<BasedSequencer<D>>>,
    submitter: TxSubmitter<D>,
    verifier: BatchVerifier<D>,
    shutdown: CancellationToken,
    next_batch_timeout: Duration,
}

impl<D: DaGateway> SequencerRpcImpl<D> {
    pub(crate) fn new(
        sequencer: BasedSequencer<D>,
        shutdown: CancellationToken,
        next_batch_timeout: Duration,
    ) -> Self {
        let submitter = sequencer.submitter();
        let verifier = sequencer.verifier();
        Self {
            sequencer: Arc::new(Mutex::new(sequencer)),
            submitter,
            verifier,
            shutdown,
            next_batch_timeout,
        }
    }

    /// Runs one derivation step in its own task so that a dropped request
    /// can only stop it at a cancellation point, never between index writes.
    async fn derive_next(&self, last: Option<BatchHash>) -> RpcResult<NextBatch> {
        let cancel = self.shutdown.child_token();
        let sequencer = self.sequencer.clone();
        let task_cancel = cancel.clone();
        let mut task = tokio::spawn(async move {
            let mut sequencer = sequencer.lock().await;
            sequencer.get_next_batch(last.as_ref(), &task_cancel).await
        });

        // Request went away, stop waiting on DA for it.
        let _guard = cancel.clone().drop_guard();

        let joined = match tokio::time::timeout(self.next_batch_timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                debug!(?last, "next batch timed out");
                cancel.cancel();
                task.await
            }
        };

        let res = joined.map_err(|e| {
            error!(%e, "next batch task failed");
            ErrorObjectOwned::owned(
                INTERNAL_ERROR_CODE,
                format!("next batch task failed: {e}"),
                None::<()>,
            )
        })?;

        res.map_err(|e| {
            if e.is_cancelled() && self.shutdown.is_cancelled() {
                ErrorObjectOwned::owned(CANCELLED_ERROR_CODE, "shutting down", None::<()>)
            } else if e.is_cancelled() {
                ErrorObjectOwned::owned(
                    CANCELLED_ERROR_CODE,
                    "timed out waiting for DA height",
                    None::<()>,
                )
            } else {
                to_rpc_error(e)
            }
        })
    }
}

#[async_trait]
impl<D: DaGateway> SequencerApiServer for SequencerRpcImpl<D> {
    async fn submit_transaction(
        &self,
        rollup_id: HexBytes,
        tx: HexBytes,
    ) -> RpcResult<RpcSubmitReceipt> {
        let rollup_id = RollupId::new(rollup_id.into_inner());
        let receipt = self
            .submitter
            .submit_rollup_transaction(&rollup_id, tx.into_inner())
            .await
            .map_err(to_rpc_error)?;
        Ok(conv_receipt(receipt))
    }

    async fn get_next_batch(&self, last_batch_hash: Option<BatchHash>) -> RpcResult<RpcBatch> {
        let next = self.derive_next(last_batch_hash).await?;
        Ok(conv_batch(next))
    }

    async fn verify_batch(&self, batch_hash: BatchHash) -> RpcResult<bool> {
        self.verifier
            .verify_batch(&batch_hash)
            .await
            .map_err(to_rpc_error)
    }
}

fn conv_batch(next: NextBatch) -> RpcBatch {
    RpcBatch {
        hash: next.hash,
        height: next.height,
        timestamp: next.timestamp,
        transactions: next
            .batch
            .into_transactions()
            .into_iter()
            .map(HexBytes)
            .collect(),
    }
}

fn conv_receipt(receipt: SubmitReceipt) -> RpcSubmitReceipt {
    RpcSubmitReceipt {
        ids: receipt
            .ids
            .into_iter()
            .map(|id| HexBytes(id.into_inner()))
            .collect(),
    }
}

fn to_rpc_error(e: SequencerError) -> ErrorObjectOwned {
    match &e {
        SequencerError::TxTooLarge { .. } => {
            ErrorObjectOwned::owned(INVALID_PARAMS_CODE, e.to_string(), None::<()>)
        }
        SequencerError::Da(_) => ErrorObjectOwned::owned(DA_ERROR_CODE, e.to_string(), None::<()>),
        SequencerError::Cancelled => {
            ErrorObjectOwned::owned(CANCELLED_ERROR_CODE, e.to_string(), None::<()>)
        }
        _ => {
            if e.is_inconsistency() {
                error!(%e, "sequencer index is inconsistent");
            }
            ErrorObjectOwned::owned(INTERNAL_ERROR_CODE, e.to_string(), None::<()>)
        }
    }
}

/// Binds the RPC server and starts serving `rpc`.
pub(crate) async fn start_rpc_server<D: DaGateway>(
    rpc: SequencerRpcImpl<D>,
    addr: &str,
) -> anyhow::Result<(SocketAddr, ServerHandle)> {
    let mut module = RpcModule::new(());
    module
        .merge(SequencerApiServer::into_rpc(rpc))
        .map_err(|e| anyhow!("Failed to merge sequencer RPC module: {e}"))?;

    let rpc_server = ServerBuilder::new()
        .build(addr)
        .await
        .map_err(|e| anyhow!("Failed to build RPC server on {addr}: {e}"))?;
    let local_addr = rpc_server.local_addr()?;

    Ok((local_addr, rpc_server.start(module)))
}

/// Serves `rpc` until `shutdown` fires.
pub(crate) async fn run_rpc_server<D: DaGateway>(
    rpc: SequencerRpcImpl<D>,
    addr: String,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let (local_addr, handle) = start_rpc_server(rpc, &addr).await?;
    info!(%local_addr, "started RPC server");

    tokio::select! {
        _ = handle.clone().stopped() => {
            warn!("RPC server stopped on its own");
        }
        _ = shutdown.cancelled() => {
            info!("stopping RPC server");
            let _ = handle.stop();
            handle.stopped().await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use based_da::{memory::InMemoryDa, MockDaGateway};
    use based_db::InMemoryHashChainDb;
    use based_primitives::{Batch, Namespace};
    use based_rpc_api::SequencerApiClient;
    use based_sequencer::SequencerConfig;
    use based_storage::HashChainManager;
    use jsonrpsee::http_client::HttpClientBuilder;
    use threadpool::ThreadPool;

    use super::*;

    fn namespace() -> Namespace {
        Namespace::from("rpc test")
    }

    async fn rpc_impl<D: DaGateway>(
        da: Arc<D>,
        timeout: Duration,
    ) -> (SequencerRpcImpl<D>, CancellationToken) {
        let index = Arc::new(HashChainManager::new(
            ThreadPool::new(2),
            Arc::new(InMemoryHashChainDb::new()),
            NonZeroUsize::new(16).unwrap(),
        ));
        let config = SequencerConfig {
            retry_interval: Duration::from_millis(2),
            ..SequencerConfig::new(namespace())
        };
        let sequencer = BasedSequencer::init(da, index, config).await.unwrap();
        let shutdown = CancellationToken::new();
        (
            SequencerRpcImpl::new(sequencer, shutdown.clone(), timeout),
            shutdown,
        )
    }

    #[tokio::test]
    async fn test_next_batch_chain() {
        let da = Arc::new(InMemoryDa::new());
        da.publish(&namespace(), vec![b"a".to_vec(), b"b".to_vec()]);
        da.publish(&namespace(), vec![b"c".to_vec()]);
        let (rpc, _shutdown) = rpc_impl(da, Duration::from_secs(5)).await;

        let first = SequencerApiServer::get_next_batch(&rpc, None).await.unwrap();
        assert_eq!(first.height, 1);
        assert_eq!(
            first.transactions,
            vec![HexBytes(b"a".to_vec()), HexBytes(b"b".to_vec())]
        );
        assert_eq!(first.hash, Batch::new(vec![b"a".to_vec(), b"b".to_vec()]).hash());
        assert_eq!(first.timestamp, InMemoryDa::timestamp_at(1));

        let second = SequencerApiServer::get_next_batch(&rpc, Some(first.hash))
            .await
            .unwrap();
        assert_eq!(second.height, 2);
        assert_eq!(second.transactions, vec![HexBytes(b"c".to_vec())]);

        // Asking again after the first hash is served from the index.
        let again = SequencerApiServer::get_next_batch(&rpc, Some(first.hash))
            .await
            .unwrap();
        assert_eq!(again, second);

        assert!(SequencerApiServer::verify_batch(&rpc, second.hash)
            .await
            .unwrap());
        assert!(
            !SequencerApiServer::verify_batch(&rpc, Batch::new(vec![b"z".to_vec()]).hash())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_next_batch_times_out() {
        let da = Arc::new(InMemoryDa::new());
        let (rpc, _shutdown) = rpc_impl(da.clone(), Duration::from_millis(20)).await;

        let err = SequencerApiServer::get_next_batch(&rpc, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), CANCELLED_ERROR_CODE);

        // Nothing was indexed, the height is still served on the next call.
        da.publish(&namespace(), vec![b"late".to_vec()]);
        let batch = SequencerApiServer::get_next_batch(&rpc, None).await.unwrap();
        assert_eq!(batch.height, 1);
    }

    #[tokio::test]
    async fn test_next_batch_after_shutdown() {
        let da = Arc::new(InMemoryDa::new());
        let (rpc, shutdown) = rpc_impl(da, Duration::from_secs(5)).await;
        shutdown.cancel();

        let err = SequencerApiServer::get_next_batch(&rpc, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), CANCELLED_ERROR_CODE);
        assert_eq!(err.message(), "shutting down");
    }

    #[tokio::test]
    async fn test_next_batch_task_panic_is_internal_error() {
        let mut da = MockDaGateway::new();
        da.expect_get_ids()
            .returning(|_, _| panic!("DA client blew up"));
        let (rpc, _shutdown) = rpc_impl(Arc::new(da), Duration::from_secs(5)).await;

        let err = SequencerApiServer::get_next_batch(&rpc, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), INTERNAL_ERROR_CODE);
        assert!(err.message().starts_with("next batch task failed"));
    }

    #[tokio::test]
    async fn test_submit_transaction() {
        let da = Arc::new(InMemoryDa::with_max_blob_size(8));
        let (rpc, _shutdown) = rpc_impl(da.clone(), Duration::from_secs(5)).await;

        let receipt = SequencerApiServer::submit_transaction(
            &rpc,
            HexBytes(b"rollup-a".to_vec()),
            HexBytes(b"payload".to_vec()),
        )
        .await
        .unwrap();
        assert_eq!(receipt.ids.len(), 1);

        let submissions = da.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].namespace.as_bytes(), b"rollup-a");
        assert_eq!(submissions[0].blobs, vec![b"payload".to_vec()]);

        let err = SequencerApiServer::submit_transaction(
            &rpc,
            HexBytes(b"rollup-a".to_vec()),
            HexBytes(b"too large payload".to_vec()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), INVALID_PARAMS_CODE);
        assert_eq!(da.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_serves_over_http() {
        let da = Arc::new(InMemoryDa::new());
        da.publish(&namespace(), vec![b"tx".to_vec()]);
        let (rpc, _shutdown) = rpc_impl(da, Duration::from_secs(5)).await;

        let (addr, handle) = start_rpc_server(rpc, "127.0.0.1:0").await.unwrap();
        let client = HttpClientBuilder::default()
            .build(format!("http://{addr}"))
            .unwrap();

        let batch = SequencerApiClient::get_next_batch(&client, None)
            .await
            .unwrap();
        assert_eq!(batch.height, 1);
        assert_eq!(batch.transactions, vec![HexBytes(b"tx".to_vec())]);
        assert!(SequencerApiClient::verify_batch(&client, batch.hash)
            .await
            .unwrap());

        handle.stop().unwrap();
        handle.stopped().await;
    }
}
