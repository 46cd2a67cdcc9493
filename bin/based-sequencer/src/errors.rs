use std::io;

use based_da::DaError;
use based_db::DbError;
use based_sequencer::SequencerError;
use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("unparsable config file: {0}")]
    MalformedConfig(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("db: {0}")]
    Db(#[from] DbError),

    #[error("da client: {0}")]
    Da(#[from] DaError),

    #[error("sequencer: {0}")]
    Sequencer(#[from] SequencerError),

    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}
