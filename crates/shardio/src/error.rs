use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShardIoError {
    #[error("source file is empty")]
    EmptySource,
    #[error("all declared input sources have already been added")]
    TooManySources,
    #[error("input source exceeded the declared output length")]
    InputLengthExceeded,
    #[error("input source bytes did not hash to the declared shard hash")]
    ShardIntegrity,
    #[error("input source ended unexpectedly while reading: {0}")]
    DownloadError(String),
    #[error("timed out waiting for the next input source")]
    UnexpectedEndOfSource,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShardIoError>;
