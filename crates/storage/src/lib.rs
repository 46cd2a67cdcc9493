//! Async storage layer over the hash-chain index.
//!
//! Database calls are blocking, so they're dispatched onto a thread pool and
//! awaited from async code through the ops shims in [`ops`].

mod cache;
mod exec;
mod manager;
pub mod ops;

pub use manager::HashChainManager;
pub use ops::HashChainOps;
