use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The object key failed validation.
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    /// The remote storage service rejected or failed the request.
    #[error("storage backend error: {0}")]
    Backend(String),
}
