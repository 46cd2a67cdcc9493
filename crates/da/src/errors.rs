use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaError {
    /// The requested height hasn't been produced by the DA layer yet.
    #[error("height {height} is in the future")]
    FutureHeight { height: u64 },

    #[error("blob not found")]
    BlobNotFound,

    #[error("blob size over limit")]
    BlobTooLarge,

    #[error("DA returned {got} blobs for {expected} ids")]
    BlobCountMismatch { expected: usize, got: usize },

    #[error("DA rpc error {code}: {message}")]
    Rpc { code: i32, message: String },

    #[error("DA transport: {0}")]
    Transport(String),

    #[error("malformed DA response: {0}")]
    Malformed(String),
}
