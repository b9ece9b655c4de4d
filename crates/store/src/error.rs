use thiserror::Error;

pub type BlobResult<T> = Result<T, BlobError>;

/// Failures surfaced by a [`crate::BlobStore`] backend.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("io error for object {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Failures surfaced by [`crate::LogAppender::append`].
///
/// Read-side failures never appear here; the reader substitutes an empty
/// log instead (see [`crate::reader`]). Write failures always propagate.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write log document {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: BlobError,
    },

    #[error("failed to serialize log document {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
