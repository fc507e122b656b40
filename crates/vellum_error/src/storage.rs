//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// No bytes are stored under the content id
    #[display("Content not found: {}", _0)]
    NotFound(String),
    /// Backend could not be reached or timed out; safe to retry
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Invalid storage path
    #[display("Invalid storage path: {}", _0)]
    InvalidPath(String),
    /// Content id cannot be used by this backend
    #[display("Invalid content id: {}", _0)]
    InvalidContentId(String),
    /// Backend stored the bytes under a different id than the one on record
    #[display("Content id mismatch: recorded {}, backend returned {}", recorded, returned)]
    ContentIdMismatch {
        /// Id already held by the descriptor
        recorded: String,
        /// Id the backend reported
        returned: String,
    },
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use vellum_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("abc".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// assert!(err.is_not_found());
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }

    /// The content id is unknown to the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }

    /// Transient failure; the caller may retry.
    ///
    /// Everything except `NotFound` and a malformed or mismatched content id counts: a
    /// filesystem read failure is as transient to the caller as a dropped connection.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self.kind,
            StorageErrorKind::NotFound(_)
                | StorageErrorKind::InvalidContentId(_)
                | StorageErrorKind::ContentIdMismatch { .. }
        )
    }
}

/// Result type for backend operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
