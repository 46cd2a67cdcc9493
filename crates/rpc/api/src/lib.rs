//! Sequencing RPC API definitions.

use based_primitives::BatchHash;
use based_rpc_types::*;
use jsonrpsee::{core::RpcResult, proc_macros::rpc};

/// Based sequencing methods.
#[cfg_attr(not(feature = "client"), rpc(server, namespace = "sequencer"))]
#[cfg_attr(feature = "client", rpc(server, client, namespace = "sequencer"))]
pub trait SequencerApi {
    /// Submits a rollup transaction to DA as a single blob under the rollup's
    /// namespace.
    #[method(name = "submitTransaction")]
    async fn submit_transaction(
        &self,
        rollup_id: HexBytes,
        tx: HexBytes,
    ) -> RpcResult<RpcSubmitReceipt>;

    /// Returns the batch following `last_batch_hash`, or the next unscanned
    /// batch if it's omitted or unknown. Waits until DA produces it.
    #[method(name = "getNextBatch")]
    async fn get_next_batch(&self, last_batch_hash: Option<BatchHash>) -> RpcResult<RpcBatch>;

    /// Checks that a batch is indexed and DA still serves it unchanged.
    #[method(name = "verifyBatch")]
    async fn verify_batch(&self, batch_hash: BatchHash) -> RpcResult<bool>;
}
