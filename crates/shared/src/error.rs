/// Error surfaced to callers of the engine, split by who has to act on it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller sent something unusable.
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<time::error::Parse> for Error {
    fn from(value: time::error::Parse) -> Self {
        Self::Invalid(value.to_string())
    }
}
