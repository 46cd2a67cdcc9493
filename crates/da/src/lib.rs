//! Interface to the data-availability layer.
//!
//! [`DaGateway`] is the contract the sequencer derives batches through.
//! [`rpc::JsonRpcDaClient`] implements it against a DA node's JSON-RPC
//! endpoint.

pub mod errors;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod rpc;
pub mod traits;
pub mod types;

pub use errors::DaError;
#[cfg(feature = "test-utils")]
pub use traits::MockDaGateway;
pub use traits::DaGateway;
pub use types::GetIdsResult;
