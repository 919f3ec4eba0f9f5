use std::error::Error;
use thiserror::Error;

/// Result alias for community backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure at the storage boundary, whichever backend produced it.
///
/// Services only distinguish "the backend could not serve this"; the
/// backend-specific cause stays available through [`Error::source`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("community backend unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a backend failure, keeping it as the error source.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
