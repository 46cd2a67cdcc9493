//! Persistent hash-chain index for the based sequencer.
//!
//! The index links each batch hash to the DA height it was derived from and to
//! the hash of the batch that follows it, and records the next height to scan.

pub mod errors;
pub mod keys;
pub mod memory;
pub mod store_sled;
pub mod traits;


pub use errors::{DbError, DbResult};
pub use memory::InMemoryHashChainDb;
pub use store_sled::{open_sled_database, HashChainDbSled, SLED_NAME};
pub use traits::HashChainDatabase;
