//! Primitive types shared by the based sequencer crates.
//!
//! A [`Batch`] is the ordered list of transactions derived from a single DA
//! height, identified only by its [`BatchHash`].

#[macro_use]
mod macros;

pub mod batch;
pub mod errors;
pub mod ids;

pub use batch::{compute_batch_hash, Batch, BatchHash, BATCH_HASH_LEN};
pub use errors::ParseError;
pub use ids::{BlobId, Namespace, RollupId};
