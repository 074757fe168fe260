use thiserror::Error;

pub type Result<T, E = StorageError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database query failed: {0}")]
    Database(#[from] libsql::Error),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),

    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violation: {0}")]
    Conflict(String),
}

impl<E: std::fmt::Display> From<deadpool::managed::PoolError<E>> for StorageError {
    fn from(error: deadpool::managed::PoolError<E>) -> Self {
        StorageError::Pool(error.to_string())
    }
}

impl From<deadpool::managed::BuildError> for StorageError {
    fn from(error: deadpool::managed::BuildError) -> Self {
        StorageError::Pool(error.to_string())
    }
}
