use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error, Clone)]
pub enum DbError {
    /// (key, expected, got)
    #[error("invalid value length under key {key}: expected {expected} bytes, got {got}")]
    InvalidValueLength {
        key: String,
        expected: usize,
        got: usize,
    },

    #[error("io: {0}")]
    IoError(String),

    #[error("sled: {0}")]
    Sled(String),

    #[error("worker failed strangely")]
    WorkerFailedStrangely,
}

impl From<sled::Error> for DbError {
    fn from(value: sled::Error) -> Self {
        match value {
            sled::Error::Io(e) => Self::IoError(e.to_string()),
            other => Self::Sled(other.to_string()),
        }
    }
}
