use thiserror::Error;

/// Errors from parsing primitive types out of raw bytes or strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}
