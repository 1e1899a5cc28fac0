use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store operation failed: {0}")]
    StoreOperation(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
