//! Based sequencing: batches are derived from the DA layer, one per height,
//! and chained by content hash so replicas can resume from any batch they've
//! seen.

mod assembler;
mod config;
mod cursor;
mod errors;
mod sequencer;
mod submitter;
mod verifier;

pub use assembler::{AssembledBatch, BatchAssembler};
pub use config::SequencerConfig;
pub use cursor::HeightCursor;
pub use errors::SequencerError;
pub use sequencer::{BasedSequencer, NextBatch};
pub use submitter::{SubmitReceipt, TxSubmitter};
pub use verifier::BatchVerifier;

#[cfg(test)]
mod test_utils;
